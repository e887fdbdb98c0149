//! Configuration management for task-gen
//!
//! The whole configuration lives in a single pretty-printed JSON file
//! (`.task-gen.conf` in the working directory by default). Its absence means
//! first-run setup has not happened yet.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = ".task-gen.conf";

lazy_static! {
    static ref HTTP_PREFIX: Regex = Regex::new(r"(?i)^https?://").unwrap();
    static ref JIRA_REST: Regex = Regex::new(r"/rest/api/").unwrap();
}

/// A Jira user allowed to be picked as reporter
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActiveDeveloper {
    /// Display name
    pub user: String,
    /// Jira account id
    pub account: String,
}

/// Everything task-gen persists between runs
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Project keys offered in the project prompt
    pub jira_projects: Vec<String>,
    /// REST base, e.g. `https://example.atlassian.net/rest/api/3`
    pub jira_base_uri: String,
    /// `email:APITOKEN`, encoded into a Basic auth header per request
    pub jira_auth: String,
    #[serde(default)]
    pub active_developers_by_project: BTreeMap<String, Vec<ActiveDeveloper>>,
}

impl AppConfig {
    /// Known active developers of a project, empty if none were fetched
    pub fn developers_for(&self, project: &str) -> &[ActiveDeveloper] {
        self.active_developers_by_project
            .get(project)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Reads and writes the configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|err| {
            Error::Config(format!("{} is not a valid config file: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_config_dir_exists(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn ensure_config_dir_exists(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Checks that a URI looks like a Jira REST base
pub fn validate_base_uri(uri: &str) -> std::result::Result<(), String> {
    if HTTP_PREFIX.is_match(uri) && JIRA_REST.is_match(uri) {
        Ok(())
    } else {
        Err("Please enter a valid Jira REST base URI.".into())
    }
}

/// Checks the `email:APITOKEN` shape of the auth value
pub fn validate_auth(auth: &str) -> std::result::Result<(), String> {
    if !auth.is_empty() && auth.contains(':') {
        Ok(())
    } else {
        Err("Expected format: email:APITOKEN".into())
    }
}

/// Splits a comma-separated list of project keys, dropping blanks
pub fn parse_project_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_project_keys(input: &str) -> std::result::Result<(), String> {
    if parse_project_keys(input).is_empty() {
        Err("Please provide at least one project key.".into())
    } else {
        Ok(())
    }
}
