use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira responded with {status}: {detail}")]
    JiraApi { status: u16, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User cancelled operation")]
    Cancelled,

    #[error("Unknown prompt kind: {0}")]
    UnknownPromptKind(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl Error {
    /// The most specific description available: the body Jira sent back for
    /// rejected requests, the display text for everything else.
    pub fn detail(&self) -> String {
        match self {
            Error::JiraApi { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
