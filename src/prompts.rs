//! The ticket creation prompt sequence
//!
//! Project, then reporter (from that project's developers), then epic, then
//! the task list in an editor.

use serde_json::{json, Map, Value};

use crate::config::AppConfig;
use crate::prompt::{Choice, PromptSpec};

pub const LABEL_PROJECT: &str = "Select Jira Project";
pub const LABEL_EPIC: &str = "Jira Epic";
pub const LABEL_TASKS: &str =
    "Input Task Names (one per line). Use form Title~Description, or Title (Title will be used as description).";

/// Label of the reporter choice used when a project has no known developers
pub const LABEL_DEFAULT_REPORTER: &str = "(Default reporter)";

/// State the ticket prompts start from
pub fn initial_state() -> Map<String, Value> {
    let mut state = Map::new();
    state.insert("project".into(), json!(""));
    state.insert("epic".into(), json!(""));
    state.insert("tickets".into(), json!([]));
    state.insert("reporter".into(), json!(""));
    state.insert("is_valid".into(), json!(true));
    state
}

/// Builds the prompt sequence for the given configuration
pub fn ticket_prompt_specs(config: &AppConfig) -> Vec<PromptSpec> {
    vec![project_prompt(config), reporter_prompt(config), epic_prompt(), tasks_prompt()]
}

fn project_prompt(config: &AppConfig) -> PromptSpec {
    PromptSpec::select("project")
        .with_message(LABEL_PROJECT)
        .with_choices(config.jira_projects.clone())
}

fn reporter_prompt(config: &AppConfig) -> PromptSpec {
    let developers = config.active_developers_by_project.clone();

    PromptSpec::select("reporter")
        .with_message_fn(|state| format!("Select Task Reporter for {}", state.get_str("project")))
        .with_choices_fn(move |state| {
            let choices: Vec<Choice> = developers
                .get(state.get_str("project"))
                .into_iter()
                .flatten()
                .map(|dev| Choice::new(dev.user.clone(), dev.account.clone()))
                .collect();

            if choices.is_empty() {
                vec![Choice::new(LABEL_DEFAULT_REPORTER, Value::Null)]
            } else {
                choices
            }
        })
}

fn epic_prompt() -> PromptSpec {
    PromptSpec::input("epic")
        .with_message(LABEL_EPIC)
        .on_apply(|state, value| {
            let epic = value.as_str().unwrap_or_default().trim().to_string();
            state.with("epic", epic)
        })
}

fn tasks_prompt() -> PromptSpec {
    PromptSpec::editor("tickets")
        .with_message(LABEL_TASKS)
        .on_apply(|state, value| state.with("tickets", parse_tasks(value.as_str())))
}

/// Splits editor text into task lines, trimmed, blanks dropped, order kept
pub fn parse_tasks(text: Option<&str>) -> Vec<String> {
    text.unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
