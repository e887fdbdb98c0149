//! User-facing outcome messages

use colored::Colorize;

use crate::ticket::TicketResult;

/// How a ticket creation session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The prompt sequence was cancelled
    Cancelled,
    /// The epic does not belong to the selected project
    EpicMismatch,
    /// The task list was empty
    NoTasks,
    /// Tickets were attempted
    Created(Vec<TicketResult>),
}

pub fn create_messages(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Cancelled => vec!["Cancelled. No tickets were created.".to_string()],
        Outcome::EpicMismatch => vec!["Epic does not match project prefix. Aborting.".to_string()],
        Outcome::NoTasks => vec!["No tasks entered. Nothing to create.".to_string()],
        Outcome::Created(results) => results.iter().map(result_message).collect(),
    }
}

fn result_message(result: &TicketResult) -> String {
    match result {
        TicketResult::Success { title } => format!("Successfully created ticket: {}", title),
        TicketResult::Error { title, error } => {
            format!("Failed to create ticket: {}. Error: {}", title, error)
        }
    }
}

/// Prints one line per message, marked by outcome
pub fn log_messages(outcome: &Outcome) {
    let marker = |index: usize| match outcome {
        Outcome::Created(results) if results[index].is_success() => "+".bright_green(),
        Outcome::Created(_) | Outcome::EpicMismatch => "x".red(),
        Outcome::Cancelled | Outcome::NoTasks => ">".bright_green(),
    };

    for (index, message) in create_messages(outcome).iter().enumerate() {
        println!("{} {}", marker(index), message);
    }
}
