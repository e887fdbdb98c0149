//! # task-gen
//!
//! An interactive tool for bulk-creating Jira tasks under an epic.

pub mod app;
pub mod cli;
pub mod config;
pub mod developers;
pub mod error;
pub mod jira;
pub mod payload;
pub mod prompt;
pub mod prompts;
pub mod report;
pub mod runner;
pub mod ticket;
pub mod ui;

// Re-export commonly used types
pub use config::{AppConfig, ConfigStore};
pub use error::{Error, Result};
pub use prompt::{PromptKind, PromptSpec, PromptState};
pub use runner::{PromptRunner, Renderer};
