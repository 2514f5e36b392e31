use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::blocks::{markdown_to_blocks, split_into_chunks, RAW_TEXT_CHUNK_SIZE};
use crate::models::{CreatedProject, DateRange, NewProject, Project, Task, TaskInput};

const NOTION_VERSION: &str = "2022-06-28";

/// Typed client for the document workspace. Every operation is a network
/// round trip; nothing is cached locally.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    diary_database_id: String,
    projects_database_id: String,
    tasks_database_id: String,
}

impl NotionClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.notion.com";

    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        diary_database_id: impl Into<String>,
        projects_database_id: impl Into<String>,
        tasks_database_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            diary_database_id: diary_database_id.into(),
            projects_database_id: projects_database_id.into(),
            tasks_database_id: tasks_database_id.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// All project pages, with page content and linked task details resolved.
    /// Fails soft: a transport error yields an empty list, which callers must
    /// treat as "unknown", not "no projects exist".
    pub async fn query_all_projects(&self) -> Vec<Project> {
        let pages = match self.query_database(&self.projects_database_id, None).await {
            Ok(pages) => pages,
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to query projects database");
                return Vec::new();
            }
        };

        let mut projects = Vec::with_capacity(pages.len());
        for page in pages {
            let project_id = page_id(&page);
            let tasks = relation_ids(&page, "Tasks");
            let page_content = self.get_page_content(&project_id).await;
            let mut task_details = Vec::with_capacity(tasks.len());
            for task_id in &tasks {
                if let Some(task) = self.get_task_details(task_id).await {
                    task_details.push(task);
                }
            }
            projects.push(Project {
                project_name: title_text(&page, "Project name"),
                status: status_name(&page, "Status"),
                owner: people_ids(&page, "Owner"),
                priority: select_name(&page, "Priority"),
                summary: rich_text_first(&page, "Summary"),
                dates: date_range(&page, "Dates"),
                project_id,
                tasks,
                page_content,
                task_details,
            });
        }
        projects
    }

    /// All task pages in their raw, unprocessed form. Empty on error.
    pub async fn query_all_tasks(&self) -> Vec<Value> {
        match self.query_database(&self.tasks_database_id, None).await {
            Ok(pages) => pages,
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to query tasks database");
                Vec::new()
            }
        }
    }

    /// Names of the tasks linked to a project, filtered server-side. A
    /// transport error is surfaced so callers can tell it apart from a
    /// project that genuinely has no tasks yet.
    pub async fn get_tasks_by_project(&self, project_id: &str) -> anyhow::Result<Vec<String>> {
        let filter = json!({
            "property": "Project",
            "relation": { "contains": project_id },
        });
        let pages = self
            .query_database(&self.tasks_database_id, Some(filter))
            .await
            .with_context(|| format!("query tasks for project {project_id}"))?;
        Ok(pages
            .iter()
            .map(|page| title_text(page, "Task name"))
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Single task read; absent on not-found or transport error.
    pub async fn get_task_details(&self, task_id: &str) -> Option<Task> {
        let page = match self.get_page(task_id).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %format!("{err:#}"), task_id, "failed to fetch task page");
                return None;
            }
        };
        Some(Task {
            task_id: task_id.to_string(),
            task_name: title_text(&page, "Task name"),
            status: status_name(&page, "Status"),
            due_date: date_start(&page, "Due"),
            priority: select_name(&page, "Priority"),
            assignee: people_ids(&page, "Assignee"),
            project: relation_ids(&page, "Project"),
        })
    }

    /// Single project read; absent on not-found or transport error. Nested
    /// content is not resolved here.
    pub async fn get_project_by_id(&self, project_id: &str) -> Option<Project> {
        let page = match self.get_page(project_id).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %format!("{err:#}"), project_id, "failed to fetch project page");
                return None;
            }
        };
        Some(Project {
            project_id: page_id(&page),
            project_name: title_text(&page, "Project name"),
            status: status_name(&page, "Status"),
            owner: people_ids(&page, "Owner"),
            priority: select_name(&page, "Priority"),
            summary: rich_text_first(&page, "Summary"),
            dates: date_range(&page, "Dates"),
            tasks: relation_ids(&page, "Tasks"),
            page_content: Vec::new(),
            task_details: Vec::new(),
        })
    }

    /// Plain-text lines of a page's non-empty blocks. Empty on error.
    pub async fn get_page_content(&self, page_id: &str) -> Vec<String> {
        let resp = self
            .http
            .get(format!("{}/v1/blocks/{}/children", self.base_url, page_id))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await;
        let blocks = match decode_results(resp, "page content").await {
            Ok(blocks) => blocks,
            Err(err) => {
                warn!(error = %format!("{err:#}"), page_id, "failed to fetch page content");
                return Vec::new();
            }
        };

        blocks
            .iter()
            .filter_map(|block| {
                let kind = block.get("type").and_then(Value::as_str)?;
                let rich_text = block.get(kind)?.get("rich_text")?.as_array()?;
                let text: String = rich_text
                    .iter()
                    .filter_map(|leaf| leaf.get("plain_text").and_then(Value::as_str))
                    .collect();
                let text = text.trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .collect()
    }

    /// Creates a project page. `dates.start` defaults to today when no dates
    /// are supplied.
    pub async fn add_project(&self, project: &NewProject) -> anyhow::Result<CreatedProject> {
        let payload = json!({
            "parent": { "database_id": self.projects_database_id },
            "properties": project_properties(project),
        });
        let page = self
            .create_page(&payload)
            .await
            .with_context(|| format!("create project '{}'", project.project_name))?;
        let project_id = page_id(&page);
        info!(project = %project.project_name, id = %project_id, "created project");
        let message = format!(
            "Project '{}' created successfully with ID: {}",
            project.project_name, project_id
        );
        Ok(CreatedProject {
            project_id,
            message,
        })
    }

    /// Creates one task page per input, each linked to the project. Items are
    /// attempted independently; the report enumerates the outcome per task in
    /// input order.
    pub async fn add_tasks_to_project(&self, project_id: &str, tasks: &[TaskInput]) -> String {
        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.create_task(project_id, task).await {
                Ok(task_id) => {
                    results.push(format!(
                        "Task '{}' created successfully with ID: {}",
                        task.task_name, task_id
                    ));
                }
                Err(err) => {
                    error!(error = %format!("{err:#}"), task = %task.task_name, "failed to create task");
                    results.push(format!(
                        "Failed to create task '{}': {err:#}",
                        task.task_name
                    ));
                }
            }
        }
        results.join("\n")
    }

    async fn create_task(&self, project_id: &str, task: &TaskInput) -> anyhow::Result<String> {
        let payload = json!({
            "parent": { "database_id": self.tasks_database_id },
            "properties": task_properties(project_id, task),
        });
        let page = self.create_page(&payload).await?;
        Ok(page_id(&page))
    }

    /// Creates the dated diary page with the rendered analysis as content,
    /// then a child page holding the raw text in fixed-size chunks.
    pub async fn create_diary_page(&self, rendered_body: &str, raw_text: &str) -> String {
        let title = Local::now().format("%d.%m.%Y").to_string();
        let children: Vec<Value> = markdown_to_blocks(rendered_body)
            .iter()
            .map(|block| block.to_json())
            .collect();
        let payload = json!({
            "parent": { "database_id": self.diary_database_id },
            "properties": { "Name": { "title": [{ "text": { "content": title } }] } },
            "children": children,
        });

        let page = match self.create_page(&payload).await {
            Ok(page) => page,
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to create diary page");
                return "Failed to create page.".to_string();
            }
        };
        let parent_id = page_id(&page);
        info!(page_id = %parent_id, "created diary page");

        let chunks = split_into_chunks(raw_text, RAW_TEXT_CHUNK_SIZE);
        let subpage_result = self
            .create_subpage(&parent_id, "Raw Diary Text", &chunks)
            .await;
        debug!(result = %subpage_result, "raw diary text subpage");

        "Page created successfully.".to_string()
    }

    async fn create_subpage(
        &self,
        parent_page_id: &str,
        title: &str,
        text_chunks: &[String],
    ) -> String {
        let children: Vec<Value> = text_chunks
            .iter()
            .map(|chunk| {
                json!({
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": { "rich_text": [{ "type": "text", "text": { "content": chunk } }] },
                })
            })
            .collect();
        let payload = json!({
            "parent": { "page_id": parent_page_id },
            "properties": { "Name": { "title": [{ "text": { "content": title } }] } },
            "children": children,
        });
        match self.create_page(&payload).await {
            Ok(_) => "Subpage created successfully.".to_string(),
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to create subpage");
                "Failed to create subpage.".to_string()
            }
        }
    }

    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<Value>,
    ) -> anyhow::Result<Vec<Value>> {
        let mut body = Map::new();
        if let Some(filter) = filter {
            body.insert("filter".to_string(), filter);
        }
        let resp = self
            .http
            .post(format!(
                "{}/v1/databases/{}/query",
                self.base_url, database_id
            ))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await;
        decode_results(resp, "database query").await
    }

    async fn get_page(&self, page_id: &str) -> anyhow::Result<Value> {
        let resp = self
            .http
            .get(format!("{}/v1/pages/{}", self.base_url, page_id))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .context("page read request")?;
        check_status(resp, "page read")
            .await?
            .json()
            .await
            .context("page read decode")
    }

    async fn create_page(&self, payload: &Value) -> anyhow::Result<Value> {
        let resp = self
            .http
            .post(format!("{}/v1/pages", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await
            .context("page create request")?;
        check_status(resp, "page create")
            .await?
            .json()
            .await
            .context("page create decode")
    }
}

async fn check_status(
    resp: reqwest::Response,
    operation: &'static str,
) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("{operation} failed with {status}: {body}");
}

async fn decode_results(
    resp: Result<reqwest::Response, reqwest::Error>,
    operation: &'static str,
) -> anyhow::Result<Vec<Value>> {
    let resp = resp.with_context(|| format!("{operation} request"))?;
    let resp = check_status(resp, operation).await?;
    let parsed: ResultsEnvelope = resp
        .json()
        .await
        .with_context(|| format!("{operation} decode"))?;
    Ok(parsed.results)
}

#[derive(Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    results: Vec<Value>,
}

// --- Property payload builders and extractors ---

fn project_properties(project: &NewProject) -> Map<String, Value> {
    let dates = project.dates.clone().unwrap_or_else(|| DateRange {
        start: Some(Local::now().format("%Y-%m-%d").to_string()),
        end: None,
    });

    let mut properties = Map::new();
    properties.insert(
        "Project name".to_string(),
        json!({ "title": [{ "text": { "content": project.project_name } }] }),
    );
    if let Some(status) = &project.status {
        properties.insert("Status".to_string(), json!({ "status": { "name": status } }));
    }
    if !project.owner.is_empty() {
        let people: Vec<Value> = project.owner.iter().map(|id| json!({ "id": id })).collect();
        properties.insert("Owner".to_string(), json!({ "people": people }));
    }
    if let Some(start) = &dates.start {
        properties.insert(
            "Dates".to_string(),
            json!({ "date": { "start": start, "end": dates.end } }),
        );
    }
    if let Some(priority) = &project.priority {
        properties.insert(
            "Priority".to_string(),
            json!({ "select": { "name": priority } }),
        );
    }
    if let Some(summary) = &project.summary {
        properties.insert(
            "Summary".to_string(),
            json!({ "rich_text": [{ "text": { "content": summary } }] }),
        );
    }
    properties
}

fn task_properties(project_id: &str, task: &TaskInput) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "Task name".to_string(),
        json!({ "title": [{ "text": { "content": task.task_name } }] }),
    );
    properties.insert(
        "Project".to_string(),
        json!({ "relation": [{ "id": project_id }] }),
    );
    if let Some(status) = &task.status {
        properties.insert("Status".to_string(), json!({ "status": { "name": status } }));
    }
    if let Some(due_date) = &task.due_date {
        properties.insert("Due".to_string(), json!({ "date": { "start": due_date } }));
    }
    if let Some(priority) = &task.priority {
        properties.insert(
            "Priority".to_string(),
            json!({ "select": { "name": priority } }),
        );
    }
    if !task.assignee.is_empty() {
        let people: Vec<Value> = task.assignee.iter().map(|id| json!({ "id": id })).collect();
        properties.insert("Assignee".to_string(), json!({ "people": people }));
    }
    properties
}

fn page_id(page: &Value) -> String {
    page.get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn prop<'a>(page: &'a Value, name: &str) -> Option<&'a Value> {
    page.get("properties")?.get(name)
}

fn title_text(page: &Value, name: &str) -> String {
    prop(page, name)
        .and_then(|p| p.get("title"))
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn rich_text_first(page: &Value, name: &str) -> String {
    prop(page, name)
        .and_then(|p| p.get("rich_text"))
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn status_name(page: &Value, name: &str) -> String {
    prop(page, name)
        .and_then(|p| p.get("status"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn select_name(page: &Value, name: &str) -> String {
    prop(page, name)
        .and_then(|p| p.get("select"))
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn people_ids(page: &Value, name: &str) -> Vec<String> {
    prop(page, name)
        .and_then(|p| p.get("people"))
        .and_then(Value::as_array)
        .map(|people| {
            people
                .iter()
                .filter_map(|person| person.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn relation_ids(page: &Value, name: &str) -> Vec<String> {
    prop(page, name)
        .and_then(|p| p.get("relation"))
        .and_then(Value::as_array)
        .map(|relations| {
            relations
                .iter()
                .filter_map(|relation| relation.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn date_range(page: &Value, name: &str) -> Option<DateRange> {
    let date = prop(page, name)?.get("date")?;
    if date.is_null() {
        return None;
    }
    Some(DateRange {
        start: date
            .get("start")
            .and_then(Value::as_str)
            .map(str::to_string),
        end: date.get("end").and_then(Value::as_str).map(str::to_string),
    })
}

fn date_start(page: &Value, name: &str) -> Option<String> {
    date_range(page, name)?.start
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;

    use super::*;

    fn sample_page() -> Value {
        json!({
            "id": "page-1",
            "properties": {
                "Project name": { "title": [{ "plain_text": "Launch" }] },
                "Status": { "status": { "name": "Backlog", "color": "gray" } },
                "Priority": { "select": { "name": "Low" } },
                "Summary": { "rich_text": [{ "plain_text": "Get it out the door" }] },
                "Owner": { "people": [{ "id": "user-1" }, { "id": "user-2" }] },
                "Tasks": { "relation": [{ "id": "task-1" }] },
                "Dates": { "date": { "start": "2026-08-01", "end": null } },
            }
        })
    }

    #[test]
    fn property_extractors_read_nested_shapes() {
        let page = sample_page();
        assert_eq!(title_text(&page, "Project name"), "Launch");
        assert_eq!(status_name(&page, "Status"), "Backlog");
        assert_eq!(select_name(&page, "Priority"), "Low");
        assert_eq!(rich_text_first(&page, "Summary"), "Get it out the door");
        assert_eq!(people_ids(&page, "Owner"), vec!["user-1", "user-2"]);
        assert_eq!(relation_ids(&page, "Tasks"), vec!["task-1"]);
        let dates = date_range(&page, "Dates").unwrap();
        assert_eq!(dates.start.as_deref(), Some("2026-08-01"));
        assert_eq!(dates.end, None);
    }

    #[test]
    fn property_extractors_tolerate_missing_properties() {
        let page = json!({ "id": "page-2", "properties": {} });
        assert_eq!(title_text(&page, "Project name"), "");
        assert!(people_ids(&page, "Owner").is_empty());
        assert!(date_range(&page, "Dates").is_none());
    }

    #[test]
    fn none_fields_are_omitted_from_write_payloads() {
        let properties = project_properties(&NewProject {
            project_name: "Launch".to_string(),
            ..Default::default()
        });
        assert!(properties.contains_key("Project name"));
        assert!(properties.contains_key("Dates"), "start defaults to today");
        assert!(!properties.contains_key("Status"));
        assert!(!properties.contains_key("Owner"));
        assert!(!properties.contains_key("Priority"));
        assert!(!properties.contains_key("Summary"));

        let properties = task_properties(
            "proj-1",
            &TaskInput {
                task_name: "Draft plan".to_string(),
                ..Default::default()
            },
        );
        assert!(properties.contains_key("Task name"));
        assert_eq!(
            properties["Project"]["relation"][0]["id"],
            json!("proj-1")
        );
        assert!(!properties.contains_key("Status"));
        assert!(!properties.contains_key("Due"));
        assert!(!properties.contains_key("Assignee"));
    }

    #[test]
    fn supplied_fields_land_in_the_payload() {
        let properties = project_properties(&NewProject {
            project_name: "Launch".to_string(),
            status: Some("Backlog".to_string()),
            owner: vec!["user-1".to_string()],
            priority: Some("Low".to_string()),
            summary: Some("short".to_string()),
            dates: Some(DateRange {
                start: Some("2026-01-01".to_string()),
                end: None,
            }),
        });
        assert_eq!(properties["Status"]["status"]["name"], json!("Backlog"));
        assert_eq!(properties["Owner"]["people"][0]["id"], json!("user-1"));
        assert_eq!(properties["Dates"]["date"]["start"], json!("2026-01-01"));
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> NotionClient {
        NotionClient::new(
            reqwest::Client::new(),
            "secret",
            "diary-db",
            "projects-db",
            "tasks-db",
        )
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn batch_task_creation_isolates_per_item_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let router = Router::new().route(
            "/v1/pages",
            post(move || {
                let n = calls2.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 1 {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "message": "boom" })),
                        )
                    } else {
                        (StatusCode::OK, Json(json!({ "id": format!("task-{n}") })))
                    }
                }
            }),
        );
        let base_url = spawn_stub(router).await;

        let tasks: Vec<TaskInput> = ["first", "second", "third"]
            .into_iter()
            .map(|name| TaskInput {
                task_name: name.to_string(),
                ..Default::default()
            })
            .collect();
        let report = client(&base_url)
            .add_tasks_to_project("proj-1", &tasks)
            .await;

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Task 'first' created successfully"));
        assert!(lines[1].starts_with("Failed to create task 'second'"));
        assert!(lines[2].starts_with("Task 'third' created successfully"));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "no early abort");
    }

    #[tokio::test]
    async fn diary_page_gets_dated_title_and_raw_text_subpage() {
        let payloads: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let payloads2 = payloads.clone();
        let router = Router::new().route(
            "/v1/pages",
            post(move |Json(payload): Json<Value>| {
                let n = {
                    let mut seen = payloads2.lock().unwrap();
                    seen.push(payload);
                    seen.len()
                };
                async move { Json(json!({ "id": format!("page-{n}") })) }
            }),
        );
        let base_url = spawn_stub(router).await;

        let result = client(&base_url)
            .create_diary_page("## Done\n- shipped", &"x".repeat(2000))
            .await;
        assert_eq!(result, "Page created successfully.");

        let payloads = payloads.lock().unwrap();
        assert_eq!(payloads.len(), 2);

        let diary = &payloads[0];
        assert_eq!(diary["parent"]["database_id"], json!("diary-db"));
        let title = diary["properties"]["Name"]["title"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(title, Local::now().format("%d.%m.%Y").to_string());
        assert_eq!(diary["children"][0]["type"], json!("heading_2"));

        let subpage = &payloads[1];
        assert_eq!(subpage["parent"]["page_id"], json!("page-1"));
        assert_eq!(
            subpage["properties"]["Name"]["title"][0]["text"]["content"],
            json!("Raw Diary Text")
        );
        let chunks = subpage["children"].as_array().unwrap();
        assert_eq!(chunks.len(), 2, "2000 chars split at 1900");
    }

    #[tokio::test]
    async fn task_listing_filters_by_relation_and_surfaces_errors() {
        let router = Router::new().route(
            "/v1/databases/{id}/query",
            post(|Json(payload): Json<Value>| async move {
                assert_eq!(
                    payload["filter"]["relation"]["contains"],
                    json!("proj-1")
                );
                Json(json!({
                    "results": [
                        { "id": "t1", "properties": { "Task name": { "title": [{ "plain_text": "Draft plan" }] } } },
                        { "id": "t2", "properties": { "Task name": { "title": [] } } },
                    ]
                }))
            }),
        );
        let base_url = spawn_stub(router).await;

        let names = client(&base_url)
            .get_tasks_by_project("proj-1")
            .await
            .unwrap();
        assert_eq!(names, vec!["Draft plan"]);

        // Unreachable store: the listing must error, not read as "no tasks".
        let unreachable = client("http://127.0.0.1:9");
        assert!(unreachable.get_tasks_by_project("proj-1").await.is_err());
    }

    #[tokio::test]
    async fn project_query_fails_soft_to_an_empty_list() {
        let unreachable = client("http://127.0.0.1:9");
        assert!(unreachable.query_all_projects().await.is_empty());
        assert!(unreachable.query_all_tasks().await.is_empty());
    }
}
