use std::fmt;

use colored::Colorize;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::validator::Validation;
use inquire::{set_global_render_config, CustomUserError, Editor, Password, PasswordDisplayMode, Select, Text};
use serde_json::Value;

use crate::config::{self, AppConfig};
use crate::error::{Error, Result};
use crate::runner::{Renderer, SelectRequest};

/// Initialize the global render configuration for inquire prompts
pub fn init_render_config() {
    let mut style = RenderConfig::default_colored();
    style.prompt_prefix = Styled::new(">").with_fg(Color::LightGreen);
    set_global_render_config(style);
}

/// A select entry shown by label, remembered by position
struct ChoiceOption {
    index: usize,
    label: String,
    muted: bool,
}

impl fmt::Display for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.muted {
            write!(f, "{}", self.label.dimmed())
        } else {
            f.write_str(&self.label)
        }
    }
}

fn choice_options(request: &SelectRequest<'_>) -> Vec<ChoiceOption> {
    request
        .choices
        .iter()
        .enumerate()
        .map(|(index, choice)| ChoiceOption {
            index,
            label: choice.label.clone(),
            muted: request.cancel_index == Some(index),
        })
        .collect()
}

/// Renders prompt steps on the terminal with inquire
///
/// Prompts run with the terminal in raw mode, so Ctrl+C comes back as
/// `OperationInterrupted` and is reported as [`Error::Cancelled`].
#[derive(Debug, Default)]
pub struct InquireRenderer;

impl InquireRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for InquireRenderer {
    fn select(&mut self, request: &SelectRequest<'_>) -> Result<Option<Value>> {
        let picked = Select::new(request.message, choice_options(request))
            .with_page_size(request.page_size)
            .prompt_skippable()
            .map_err(map_inquire_error)?;

        Ok(picked.map(|option| request.choices[option.index].value.clone()))
    }

    fn input(&mut self, message: &str) -> Result<Option<String>> {
        Text::new(message).prompt_skippable().map_err(map_inquire_error)
    }

    fn editor(&mut self, message: &str) -> Result<String> {
        Editor::new(message)
            .with_formatter(&|text: &str| {
                let lines = text.lines().filter(|line| !line.trim().is_empty()).count();
                format!("{} line(s)", lines)
            })
            .prompt()
            .map_err(map_inquire_error)
    }
}

/// Prompt for Jira connection settings and project keys on first run
pub fn prompt_jira_settings() -> Result<AppConfig> {
    let jira_base_uri = Text::new("Enter Jira Base URI")
        .with_placeholder("https://your-domain.atlassian.net/rest/api/3")
        .with_validator(|uri: &str| as_validation(config::validate_base_uri(uri.trim())))
        .prompt()
        .map_err(map_inquire_error)?;

    let jira_auth = Password::new("Enter Jira auth as email:APITOKEN")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(|auth: &str| as_validation(config::validate_auth(auth)))
        .prompt()
        .map_err(map_inquire_error)?;

    let projects = Text::new("Enter comma-separated Jira project keys (e.g., ENBL,ABC)")
        .with_validator(|keys: &str| as_validation(config::validate_project_keys(keys)))
        .prompt()
        .map_err(map_inquire_error)?;

    Ok(AppConfig {
        jira_projects: config::parse_project_keys(&projects),
        jira_base_uri: jira_base_uri.trim().to_string(),
        jira_auth,
        ..AppConfig::default()
    })
}

fn as_validation(check: std::result::Result<(), String>) -> std::result::Result<Validation, CustomUserError> {
    match check {
        Ok(()) => Ok(Validation::Valid),
        Err(message) => Ok(Validation::Invalid(message.into())),
    }
}

/// Map inquire errors to our error type
fn map_inquire_error(err: InquireError) -> Error {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Error::Cancelled,
        _ => Error::Prompt(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::prompt::Choice;

    #[test]
    fn test_interrupt_and_escape_map_to_cancel() {
        assert!(matches!(
            map_inquire_error(InquireError::OperationInterrupted),
            Error::Cancelled
        ));
        assert!(matches!(map_inquire_error(InquireError::OperationCanceled), Error::Cancelled));
        assert!(matches!(
            map_inquire_error(InquireError::NotTTY),
            Error::Prompt(_)
        ));
    }

    #[test]
    fn test_only_cancel_entry_is_muted() {
        let choices = vec![Choice::from("ENBL"), Choice::from("ABC"), Choice::new("(Cancel)", "")];
        let request = SelectRequest {
            message: "Project",
            choices: &choices,
            page_size: 3,
            cancel_index: Some(2),
        };

        let options = choice_options(&request);

        let muted: Vec<bool> = options.iter().map(|option| option.muted).collect();
        assert_eq!(muted, vec![false, false, true]);
        assert_eq!(options[0].to_string(), "ENBL");
        assert!(options[2].to_string().contains("(Cancel)"));
    }

    #[test]
    fn test_nothing_muted_without_cancel_entry() {
        let choices = vec![Choice::from("ENBL")];
        let request = SelectRequest {
            message: "Project",
            choices: &choices,
            page_size: 1,
            cancel_index: None,
        };

        assert!(choice_options(&request).iter().all(|option| !option.muted));
    }

    #[test]
    fn test_as_validation() {
        assert!(matches!(as_validation(Ok(())), Ok(Validation::Valid)));
        assert!(matches!(
            as_validation(Err("nope".into())),
            Ok(Validation::Invalid(_))
        ));
    }
}
