//! Schema-constrained extraction over the free-text completion service.
//!
//! The model is prompted for JSON; the raw output goes through a strict
//! decode, and on mismatch through exactly one corrective re-prompt before
//! the operation is reported as failed.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::openai::Completion;
use crate::prompts;

/// Format instructions appended to every project extraction prompt.
pub const PROJECT_JSON_FORMAT: &str = r#"Respond with a JSON array. Each element is an object with these fields:
{
  "project_id": string or null,
  "project_name": string,
  "summary": string,
  "new_project": boolean
}"#;

/// Format instructions appended to every task identification prompt.
pub const TASK_JSON_FORMAT: &str = r#"Respond with a JSON array. Each element is an object with these fields:
{
  "project_name": string,
  "task_name": string,
  "status": string,
  "due_date": "YYYY-MM-DD" or null,
  "new_task": boolean
}"#;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("completion service call failed: {0:#}")]
    Completion(anyhow::Error),
    #[error("model output did not match the expected schema after one repair pass: {0}")]
    RepairFailed(serde_json::Error),
}

/// One candidate project mentioned in a diary entry. `new_project` stays
/// `None` when the model omitted the discriminator; callers skip those.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectExtraction {
    #[serde(default)]
    pub project_id: Option<String>,
    pub project_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub new_project: Option<bool>,
}

/// One candidate task mentioned for a given project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskExtraction {
    #[serde(default)]
    pub project_name: String,
    pub task_name: String,
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub new_task: Option<bool>,
}

fn default_task_status() -> String {
    "Not Started".to_string()
}

/// The model sometimes returns a bare object where an array was asked for.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

pub struct Extractor<C> {
    llm: C,
}

impl<C: Completion> Extractor<C> {
    pub fn new(llm: C) -> Self {
        Self { llm }
    }

    /// Extracts project mentions from a diary entry, comparing against the
    /// known-project listing when one exists.
    pub async fn extract_projects(
        &self,
        known_projects: &str,
        diary_text: &str,
    ) -> Result<Vec<ProjectExtraction>, ExtractError> {
        let system = prompts::project_extraction(known_projects, PROJECT_JSON_FORMAT);
        self.complete_structured(&system, diary_text, PROJECT_JSON_FORMAT)
            .await
    }

    /// Identifies task mentions for a project that already has tracked tasks.
    pub async fn identify_tasks(
        &self,
        project_name: &str,
        existing_tasks: &str,
        diary_text: &str,
    ) -> Result<Vec<TaskExtraction>, ExtractError> {
        let system = prompts::task_identification(project_name, existing_tasks, TASK_JSON_FORMAT);
        self.complete_structured(&system, diary_text, TASK_JSON_FORMAT)
            .await
    }

    /// Cold-start variant for a project with no tracked tasks.
    pub async fn identify_initial_tasks(
        &self,
        project_name: &str,
        diary_text: &str,
    ) -> Result<Vec<TaskExtraction>, ExtractError> {
        let system = prompts::initial_task_identification(project_name, TASK_JSON_FORMAT);
        self.complete_structured(&system, diary_text, TASK_JSON_FORMAT)
            .await
    }

    async fn complete_structured<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        json_format: &str,
    ) -> Result<Vec<T>, ExtractError> {
        let raw = self
            .llm
            .complete(system, user, 0.0)
            .await
            .map_err(ExtractError::Completion)?;

        match decode::<T>(&raw) {
            Ok(items) => Ok(items),
            Err(err) => {
                warn!(error = %err, "model output failed schema decode; attempting repair");
                let repair = prompts::output_repair(json_format, &raw);
                let repaired = self
                    .llm
                    .complete(&repair, "", 0.0)
                    .await
                    .map_err(ExtractError::Completion)?;
                decode::<T>(&repaired).map_err(ExtractError::RepairFailed)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    let payload = extract_json_payload(raw);
    serde_json::from_str::<OneOrMany<T>>(payload).map(OneOrMany::into_vec)
}

/// Locates the JSON payload inside a model reply, stripping code fences and
/// surrounding prose.
fn extract_json_payload(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + 7..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }
    if let Some(start) = trimmed.find("```") {
        let body = &trimmed[start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    let object = trimmed
        .find('{')
        .and_then(|start| trimmed.rfind('}').map(|end| (start, end)));
    let array = trimmed
        .find('[')
        .and_then(|start| trimmed.rfind(']').map(|end| (start, end)));
    let span = match (object, array) {
        (Some(obj), Some(arr)) => {
            if arr.0 < obj.0 {
                Some(arr)
            } else {
                Some(obj)
            }
        }
        (Some(obj), None) => Some(obj),
        (None, Some(arr)) => Some(arr),
        (None, None) => None,
    };
    match span {
        Some((start, end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::testing::ScriptedCompletion;

    const DIARY: &str = "Kicked off the Launch project and drafted the plan.";

    #[test]
    fn payload_extraction_handles_fences_and_prose() {
        assert_eq!(extract_json_payload(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(
            extract_json_payload("```json\n[{\"a\":1}]\n```"),
            r#"[{"a":1}]"#
        );
        assert_eq!(
            extract_json_payload("Here you go: [{\"a\":1}] hope that helps"),
            r#"[{"a":1}]"#
        );
        assert_eq!(
            extract_json_payload("The object {\"a\":1} is the answer"),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn single_object_is_coerced_to_a_list() {
        let items: Vec<ProjectExtraction> =
            decode(r#"{"project_name":"Launch","summary":"s","new_project":true}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].project_name, "Launch");
        assert_eq!(items[0].new_project, Some(true));
    }

    #[test]
    fn missing_discriminator_decodes_to_none() {
        let items: Vec<ProjectExtraction> =
            decode(r#"[{"project_name":"Launch","summary":"s"}]"#).unwrap();
        assert_eq!(items[0].new_project, None);
    }

    #[test]
    fn task_status_defaults_when_absent() {
        let items: Vec<TaskExtraction> =
            decode(r#"[{"project_name":"Launch","task_name":"Draft plan","new_task":true}]"#)
                .unwrap();
        assert_eq!(items[0].status, "Not Started");
        assert_eq!(items[0].due_date, None);
    }

    #[tokio::test]
    async fn empty_inventory_uses_cold_start_template() {
        let llm = ScriptedCompletion::replying(["[]"]);
        let extractor = Extractor::new(&llm);
        let result = extractor.extract_projects("", DIARY).await.unwrap();
        assert!(result.is_empty());

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("No projects are tracked yet"));
        assert!(!calls[0].system.contains("already tracked"));
        assert_eq!(calls[0].user, DIARY);
        assert_eq!(calls[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn known_inventory_uses_compare_template() {
        let llm = ScriptedCompletion::replying(["[]"]);
        let extractor = Extractor::new(&llm);
        extractor
            .extract_projects("Project-Id: p1, Project-Name: Launch", DIARY)
            .await
            .unwrap();

        let calls = llm.calls.lock().unwrap();
        assert!(calls[0].system.contains("already tracked"));
        assert!(calls[0].system.contains("Project-Id: p1, Project-Name: Launch"));
    }

    #[tokio::test]
    async fn malformed_output_is_repaired_once() {
        let llm = ScriptedCompletion::replying([
            "definitely not json",
            r#"[{"project_name":"Launch","summary":"s","new_project":true}]"#,
        ]);
        let extractor = Extractor::new(&llm);
        let result = extractor.extract_projects("", DIARY).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].project_name, "Launch");

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 2, "exactly one repair invocation");
        assert!(calls[1].system.contains("definitely not json"));
        assert!(calls[1].system.contains("could not be parsed"));
    }

    #[tokio::test]
    async fn failed_repair_is_a_distinct_error() {
        let llm = ScriptedCompletion::replying(["still not json", "also not json"]);
        let extractor = Extractor::new(&llm);
        let err = extractor.extract_projects("", DIARY).await.unwrap_err();
        assert!(matches!(err, ExtractError::RepairFailed(_)));
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn transport_failure_is_not_a_schema_failure() {
        let llm = ScriptedCompletion::failing("connection reset");
        let extractor = Extractor::new(&llm);
        let err = extractor.extract_projects("", DIARY).await.unwrap_err();
        assert!(matches!(err, ExtractError::Completion(_)));
    }

    #[tokio::test]
    async fn initial_task_variant_has_no_existing_task_listing() {
        let llm = ScriptedCompletion::replying(["[]"]);
        let extractor = Extractor::new(&llm);
        extractor
            .identify_initial_tasks("Launch", DIARY)
            .await
            .unwrap();

        let calls = llm.calls.lock().unwrap();
        assert!(calls[0].system.contains("has no tasks yet"));
        assert!(calls[0].system.contains("\"Launch\""));
    }

    #[tokio::test]
    async fn task_variant_carries_the_existing_listing() {
        let llm = ScriptedCompletion::replying(["[]"]);
        let extractor = Extractor::new(&llm);
        extractor
            .identify_tasks("Launch", "Draft plan\nShip it\n", DIARY)
            .await
            .unwrap();

        let calls = llm.calls.lock().unwrap();
        assert!(calls[0].system.contains("Draft plan\nShip it"));
        assert!(!calls[0].system.contains("has no tasks yet"));
    }
}
