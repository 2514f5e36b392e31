//! Prompt templates for the completion service, bundled at compile time.

pub const DIARY_SUMMARY: &str = include_str!("../prompts/diary_summary.md");
pub const DIARY_NEXT_STEPS: &str = include_str!("../prompts/diary_next_steps.md");

const PROJECTS_COLD_START: &str = include_str!("../prompts/projects_cold_start.md");
const PROJECTS_COMPARE: &str = include_str!("../prompts/projects_compare.md");
const TASKS_FOR_PROJECT: &str = include_str!("../prompts/tasks_for_project.md");
const TASKS_INITIAL: &str = include_str!("../prompts/tasks_initial.md");
const OUTPUT_REPAIR: &str = include_str!("../prompts/output_repair.md");

/// Project extraction prompt. Falls back to the cold-start variant when the
/// known-project listing is empty.
pub fn project_extraction(known_projects: &str, json_format: &str) -> String {
    if known_projects.trim().is_empty() {
        PROJECTS_COLD_START.replace("{json_format}", json_format)
    } else {
        PROJECTS_COMPARE
            .replace("{known_projects}", known_projects)
            .replace("{json_format}", json_format)
    }
}

pub fn task_identification(project_name: &str, existing_tasks: &str, json_format: &str) -> String {
    TASKS_FOR_PROJECT
        .replace("{project_name}", project_name)
        .replace("{existing_tasks}", existing_tasks)
        .replace("{json_format}", json_format)
}

pub fn initial_task_identification(project_name: &str, json_format: &str) -> String {
    TASKS_INITIAL
        .replace("{project_name}", project_name)
        .replace("{json_format}", json_format)
}

pub fn output_repair(json_format: &str, previous_output: &str) -> String {
    OUTPUT_REPAIR
        .replace("{json_format}", json_format)
        .replace("{previous_output}", previous_output)
}
