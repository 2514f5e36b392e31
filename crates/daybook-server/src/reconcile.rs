//! The reconciliation engine: turns one diary entry into the minimal set of
//! project and task creations needed to keep the tracker current, using the
//! external store as the only source of truth.

use std::future::Future;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::extract::{Extractor, ProjectExtraction, TaskExtraction};
use crate::models::{CreatedProject, NewProject, Project, TaskInput};
use crate::notion::NotionClient;
use crate::openai::Completion;

pub const DEFAULT_PROJECT_STATUS: &str = "Backlog";
pub const DEFAULT_PRIORITY: &str = "Low";
pub const DEFAULT_TASK_STATUS: &str = "Not Started";

/// Store operations the engine needs. `NotionClient` implements this; tests
/// substitute a scripted stub.
pub trait ProjectStore: Send + Sync {
    fn query_all_projects(&self) -> impl Future<Output = Vec<Project>> + Send;

    /// Distinguishes "no tasks yet" (`Ok(vec![])`) from a store failure.
    fn get_tasks_by_project(
        &self,
        project_id: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;

    fn add_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = anyhow::Result<CreatedProject>> + Send;

    fn add_tasks_to_project(
        &self,
        project_id: &str,
        tasks: &[TaskInput],
    ) -> impl Future<Output = String> + Send;
}

impl<S: ProjectStore> ProjectStore for &S {
    fn query_all_projects(&self) -> impl Future<Output = Vec<Project>> + Send {
        (**self).query_all_projects()
    }

    fn get_tasks_by_project(
        &self,
        project_id: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send {
        (**self).get_tasks_by_project(project_id)
    }

    fn add_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = anyhow::Result<CreatedProject>> + Send {
        (**self).add_project(project)
    }

    fn add_tasks_to_project(
        &self,
        project_id: &str,
        tasks: &[TaskInput],
    ) -> impl Future<Output = String> + Send {
        (**self).add_tasks_to_project(project_id, tasks)
    }
}

impl ProjectStore for NotionClient {
    fn query_all_projects(&self) -> impl Future<Output = Vec<Project>> + Send {
        self.query_all_projects()
    }

    fn get_tasks_by_project(
        &self,
        project_id: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send {
        self.get_tasks_by_project(project_id)
    }

    fn add_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = anyhow::Result<CreatedProject>> + Send {
        self.add_project(project)
    }

    fn add_tasks_to_project(
        &self,
        project_id: &str,
        tasks: &[TaskInput],
    ) -> impl Future<Output = String> + Send {
        self.add_tasks_to_project(project_id, tasks)
    }
}

pub struct Reconciler<S, C> {
    store: S,
    extractor: Extractor<C>,
    default_owner_id: String,
}

impl<S: ProjectStore, C: Completion> Reconciler<S, C> {
    pub fn new(store: S, llm: C, default_owner_id: impl Into<String>) -> Self {
        Self {
            store,
            extractor: Extractor::new(llm),
            default_owner_id: default_owner_id.into(),
        }
    }

    /// One reconciliation pass for a diary entry. Failures are contained per
    /// extracted project; the pass itself never fails the caller.
    pub async fn run(&self, diary_text: &str) {
        let projects = self.store.query_all_projects().await;
        let known = known_projects_listing(&projects);

        let extracted = match self.extractor.extract_projects(&known, diary_text).await {
            Ok(extracted) => extracted,
            Err(err) => {
                error!(error = %err, "project extraction failed; skipping reconciliation");
                return;
            }
        };
        if extracted.is_empty() {
            info!("no project mentions extracted from diary entry");
            return;
        }

        for result in &extracted {
            if let Err(err) = self.process_project(&projects, result, diary_text).await {
                error!(
                    error = %format!("{err:#}"),
                    project = %result.project_name,
                    "failed to reconcile project"
                );
            }
        }
    }

    async fn process_project(
        &self,
        known: &[Project],
        result: &ProjectExtraction,
        diary_text: &str,
    ) -> anyhow::Result<()> {
        let (project_id, project_name) = match result.new_project {
            Some(true) => self.resolve_new_project(known, result).await?,
            Some(false) => {
                let project_id = result
                    .project_id
                    .clone()
                    .context("extraction marked an existing project but carried no project_id")?;
                (project_id, result.project_name.clone())
            }
            None => {
                warn!(
                    project = %result.project_name,
                    "extraction result missing new_project flag; skipping"
                );
                return Ok(());
            }
        };

        // A store error here must not read as "zero tasks": falling into the
        // cold-start branch on a transient failure would re-create tasks.
        let existing_tasks = self
            .store
            .get_tasks_by_project(&project_id)
            .await
            .with_context(|| format!("list tasks for project {project_id}"))?;

        let candidates = if existing_tasks.is_empty() {
            self.extractor
                .identify_initial_tasks(&project_name, diary_text)
                .await?
        } else {
            let joined = existing_tasks.join("\n") + "\n";
            self.extractor
                .identify_tasks(&project_name, &joined, diary_text)
                .await?
        };

        let inputs = self.task_inputs(&candidates);
        if inputs.is_empty() {
            return Ok(());
        }
        info!(count = inputs.len(), project = %project_name, "adding tasks");
        let report = self.store.add_tasks_to_project(&project_id, &inputs).await;
        info!(report = %report, "task creation report");
        Ok(())
    }

    /// Creates the project, unless the extracted name exactly matches one
    /// already in the inventory; then the existing id is reused so a model
    /// misjudgment cannot duplicate a tracked project.
    async fn resolve_new_project(
        &self,
        known: &[Project],
        result: &ProjectExtraction,
    ) -> anyhow::Result<(String, String)> {
        let wanted = result.project_name.trim();
        if let Some(existing) = known
            .iter()
            .find(|p| p.project_name.trim().eq_ignore_ascii_case(wanted))
        {
            warn!(
                project = %existing.project_name,
                id = %existing.project_id,
                "extraction flagged an already-tracked project as new; reusing it"
            );
            return Ok((existing.project_id.clone(), existing.project_name.clone()));
        }

        let created = self
            .store
            .add_project(&NewProject {
                project_name: result.project_name.clone(),
                status: Some(DEFAULT_PROJECT_STATUS.to_string()),
                owner: vec![self.default_owner_id.clone()],
                priority: Some(DEFAULT_PRIORITY.to_string()),
                summary: Some(result.summary.clone()),
                dates: None,
            })
            .await?;
        info!(result = %created.message, "created project");
        Ok((created.project_id, result.project_name.clone()))
    }

    fn task_inputs(&self, candidates: &[TaskExtraction]) -> Vec<TaskInput> {
        let mut inputs = Vec::new();
        for candidate in candidates {
            match candidate.new_task {
                Some(true) => inputs.push(TaskInput {
                    task_name: candidate.task_name.clone(),
                    status: Some(DEFAULT_TASK_STATUS.to_string()),
                    due_date: None,
                    priority: Some(DEFAULT_PRIORITY.to_string()),
                    assignee: vec![self.default_owner_id.clone()],
                }),
                Some(false) => {}
                None => warn!(
                    task = %candidate.task_name,
                    "task result missing new_task flag; skipping"
                ),
            }
        }
        inputs
    }
}

/// One line per tracked project, the exact form the extraction prompt shows
/// the model.
pub fn known_projects_listing(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|p| {
            format!(
                "Project-Id: {}, Project-Name: {}",
                p.project_id, p.project_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
