//! Ticket requests and ticket creation
//!
//! Turns the answers gathered by the prompt sequence into one [`TicketSpec`]
//! per task line and creates them in Jira concurrently. Each ticket succeeds
//! or fails on its own.

use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::jira::JiraApi;
use crate::payload::build_payload;
use crate::prompt::PromptState;

/// What the user asked for, read back from the prompt state
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TicketRequest {
    pub project: String,
    pub epic: String,
    pub tickets: Vec<String>,
    pub reporter: Option<String>,
    pub is_valid: bool,
}

impl Default for TicketRequest {
    fn default() -> Self {
        Self {
            project: String::new(),
            epic: String::new(),
            tickets: Vec::new(),
            reporter: None,
            is_valid: true,
        }
    }
}

impl TicketRequest {
    pub fn from_state(state: &PromptState) -> Result<Self> {
        serde_json::from_value(Value::Object(state.fields().clone())).map_err(|err| {
            Error::InvalidInput(format!("prompt answers do not form a ticket request: {}", err))
        })
    }

    /// Reporter account id, if one was chosen
    pub fn reporter_account(&self) -> Option<&str> {
        self.reporter.as_deref().filter(|account| !account.is_empty())
    }
}

/// True when the epic key belongs to `project` (`PROJ-123` for `PROJ`)
///
/// An epic without a hyphen is compared whole; an empty epic never matches.
pub fn epic_matches_project(epic: &str, project: &str) -> bool {
    if epic.is_empty() {
        return false;
    }
    epic.split('-').next() == Some(project)
}

/// Marks the request valid or invalid depending on the epic/project pair
pub fn validate_user_input(request: TicketRequest) -> TicketRequest {
    let is_valid = epic_matches_project(&request.epic, &request.project);
    TicketRequest { is_valid, ..request }
}

/// One ticket to create
#[derive(Debug, Clone, PartialEq)]
pub struct TicketSpec {
    pub project: String,
    pub epic: String,
    pub title: String,
    pub reporter: Option<String>,
}

/// One spec per task line, in input order; none for an invalid request
pub fn build_ticket_specs(request: &TicketRequest) -> Vec<TicketSpec> {
    if !request.is_valid {
        return Vec::new();
    }

    let reporter = request.reporter_account().map(str::to_string);
    request
        .tickets
        .iter()
        .map(|ticket| TicketSpec {
            project: request.project.clone(),
            epic: request.epic.clone(),
            title: ticket.trim().to_string(),
            reporter: reporter.clone(),
        })
        .collect()
}

/// Outcome of creating a single ticket
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TicketResult {
    Success { title: String },
    Error { title: String, error: String },
}

impl TicketResult {
    pub fn title(&self) -> &str {
        match self {
            TicketResult::Success { title } | TicketResult::Error { title, .. } => title,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TicketResult::Success { .. })
    }
}

/// Creates a single ticket, capturing any failure in the result
pub fn create_ticket<A: JiraApi + ?Sized>(api: &A, spec: &TicketSpec) -> TicketResult {
    let payload = build_payload(&spec.project, &spec.epic, &spec.title, spec.reporter.as_deref());

    let created = serde_json::to_value(&payload)
        .map_err(Error::from)
        .and_then(|body| api.post_issue(&body));

    match created {
        Ok(_) => TicketResult::Success {
            title: spec.title.clone(),
        },
        Err(err) => {
            tracing::debug!(title = %spec.title, error = %err, "ticket creation failed");
            TicketResult::Error {
                title: spec.title.clone(),
                error: err.detail(),
            }
        }
    }
}

/// Creates all tickets concurrently; results follow the order of `specs`
pub fn create_tickets<A: JiraApi + ?Sized>(api: &A, specs: &[TicketSpec]) -> Vec<TicketResult> {
    thread::scope(|scope| {
        let handles: Vec<_> = specs
            .iter()
            .map(|spec| scope.spawn(move || create_ticket(api, spec)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}
