/// A project page as read from the tracker database, with its nested page
/// content and linked task details resolved.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub status: String,
    pub owner: Vec<String>,
    pub priority: String,
    pub summary: String,
    pub dates: Option<DateRange>,
    /// Relation page ids of the project's tasks.
    pub tasks: Vec<String>,
    pub page_content: Vec<String>,
    pub task_details: Vec<Task>,
}

#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A task page as read from the tracker database.
#[derive(Debug, Clone, Default)]
pub struct Task {
    pub task_id: String,
    pub task_name: String,
    pub status: String,
    /// ISO-8601 start value as stored, when a due date is set.
    pub due_date: Option<String>,
    pub priority: String,
    pub assignee: Vec<String>,
    /// Relation page ids; a created task always links exactly one project.
    pub project: Vec<String>,
}

/// Write-side input for project creation. `None` fields are omitted from the
/// write payload entirely.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub project_name: String,
    pub status: Option<String>,
    pub owner: Vec<String>,
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub dates: Option<DateRange>,
}

/// Write-side input for task creation within a batch.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub task_name: String,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub assignee: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub project_id: String,
    pub message: String,
}
