use clap::Parser;

/// Process configuration. Every credential is required at startup; a missing
/// one fails the parse before any message is accepted.
#[derive(Parser, Debug, Clone)]
#[command(name = "daybook-server")]
pub struct Config {
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Notion integration token.
    #[arg(long, env = "NOTION_API_KEY")]
    pub notion_api_key: String,

    /// Database receiving the dated diary pages.
    #[arg(long, env = "NOTION_DIARY_DATABASE_ID")]
    pub diary_database_id: String,

    /// Database holding the project tracker pages.
    #[arg(long, env = "NOTION_PROJECTS_DATABASE_ID")]
    pub projects_database_id: String,

    /// Database holding the task pages, related to projects.
    #[arg(long, env = "NOTION_TASKS_DATABASE_ID")]
    pub tasks_database_id: String,

    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "chatgpt-4o-latest")]
    pub openai_model: String,

    /// Bot Framework app credentials used to deliver replies.
    #[arg(long, env = "MSTEAMS_APP_ID")]
    pub msteams_app_id: String,

    #[arg(long, env = "MSTEAMS_APP_PASSWORD")]
    pub msteams_app_password: String,

    /// Workspace member set as owner of auto-created projects and assignee of
    /// auto-created tasks.
    #[arg(long, env = "DEFAULT_OWNER_ID")]
    pub default_owner_id: String,
}
