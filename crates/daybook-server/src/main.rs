use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use daybook_server::config::Config;
use daybook_server::notion::NotionClient;
use daybook_server::openai::OpenAiClient;
use daybook_server::reconcile::Reconciler;
use daybook_server::summarize;
use daybook_server::teams::{Activity, TeamsClient};

const GENERIC_ERROR_REPLY: &str = "An error occurred while processing your diary entry.";

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    http: reqwest::Client,
    teams: TeamsClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Arc::new(Config::parse());

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(120))
        .build()
        .context("build reqwest client")?;

    let teams = TeamsClient::new(
        http.clone(),
        config.msteams_app_id.clone(),
        config.msteams_app_password.clone(),
    );

    let state = AppState {
        config: config.clone(),
        http,
        teams,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/messages", post(bot_messages))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Bot Framework activity webhook. Every inbound message gets exactly one
/// reply: the analysis on success, the generic error text otherwise.
async fn bot_messages(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let activity: Activity = match serde_json::from_slice(&body) {
        Ok(activity) => activity,
        Err(err) => {
            warn!(error = %err, "invalid activity payload");
            return (StatusCode::BAD_REQUEST, "invalid payload");
        }
    };

    if activity.kind != "message" {
        return (StatusCode::OK, "");
    }
    let text = activity.text.as_deref().unwrap_or("").trim().to_string();
    if text.is_empty() {
        return (StatusCode::OK, "");
    }
    if let Some(from) = &activity.from {
        info!(user = %from.id, "processing diary message");
    }

    // The spawn is the failure boundary: a panic anywhere in the pipeline
    // still produces the one guaranteed reply.
    let reply = match tokio::spawn(process_message(state.clone(), text)).await {
        Ok(reply) => reply,
        Err(err) => {
            error!(error = %err, "diary message processing aborted");
            GENERIC_ERROR_REPLY.to_string()
        }
    };

    if let Err(err) = send_reply(&state, &activity, &reply).await {
        error!(error = %format!("{err:#}"), "failed to deliver reply");
    }
    (StatusCode::OK, "")
}

/// The per-message pipeline: summary + next steps, diary persistence, then
/// project/task reconciliation. Each stage degrades on its own; the reply is
/// always assembled.
async fn process_message(state: AppState, raw_diary: String) -> String {
    let openai = OpenAiClient::new(
        state.http.clone(),
        state.config.openai_api_key.clone(),
        state.config.openai_model.clone(),
    );
    let notion = NotionClient::new(
        state.http.clone(),
        state.config.notion_api_key.clone(),
        state.config.diary_database_id.clone(),
        state.config.projects_database_id.clone(),
        state.config.tasks_database_id.clone(),
    );

    let summary = summarize::generate_summary(&openai, &raw_diary).await;
    let next_steps = summarize::generate_next_steps(&openai, &summary).await;
    let analysis = format!("{summary}\n\n---\n\n{next_steps}");

    let store_result = notion.create_diary_page(&analysis, &raw_diary).await;

    Reconciler::new(&notion, &openai, state.config.default_owner_id.clone())
        .run(&raw_diary)
        .await;

    format!("{store_result}\n\n{analysis}")
}

async fn send_reply(state: &AppState, activity: &Activity, text: &str) -> anyhow::Result<()> {
    let service_url = activity
        .service_url
        .as_deref()
        .context("activity missing serviceUrl")?;
    let conversation = activity
        .conversation
        .as_ref()
        .context("activity missing conversation")?;
    state
        .teams
        .reply(service_url, &conversation.id, activity.id.as_deref(), text)
        .await
}
