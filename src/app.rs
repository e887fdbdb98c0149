use colored::Colorize;

use crate::cli::Args;
use crate::config::{AppConfig, ConfigStore};
use crate::developers::append_active_developers;
use crate::error::Result;
use crate::jira::{JiraApi, JiraClient};
use crate::prompts;
use crate::report::{self, Outcome};
use crate::runner::{PromptRunner, Renderer};
use crate::ticket::{build_ticket_specs, create_tickets, validate_user_input, TicketRequest};
use crate::ui::{self, InquireRenderer};

/// Main application entry point
pub fn run(args: Args) -> Result<()> {
    ui::init_render_config();

    let store = ConfigStore::new(&args.config);
    let config = ensure_configured(&store)?;
    let client = JiraClient::new(&config)?;

    let mut renderer = InquireRenderer::new();
    let outcome = collect_and_create(&config, &mut renderer, &client)?;
    report::log_messages(&outcome);

    Ok(())
}

/// Load the configuration, running first-time setup if there is none
pub fn ensure_configured(store: &ConfigStore) -> Result<AppConfig> {
    if store.exists() {
        return store.load();
    }

    println!(
        "{} No configuration found at {}. Starting setup.",
        ">".bright_green(),
        store.path().display().to_string().bright_cyan()
    );

    let settings = ui::prompt_jira_settings()?;
    // Developer lookup needs the freshly entered credentials
    let client = JiraClient::new(&settings)?;
    finish_setup(settings, &client, store)
}

/// Enrich entered settings with active developers and persist them
pub fn finish_setup<A: JiraApi + ?Sized>(settings: AppConfig, api: &A, store: &ConfigStore) -> Result<AppConfig> {
    let config = append_active_developers(settings, api);
    store.save(&config)?;

    println!(
        "{} Configuration saved to {}",
        ">".bright_green(),
        store.path().display().to_string().bright_cyan()
    );
    Ok(config)
}

/// Walk the ticket prompts and create whatever the user asked for
pub fn collect_and_create<R, A>(config: &AppConfig, renderer: &mut R, api: &A) -> Result<Outcome>
where
    R: Renderer + ?Sized,
    A: JiraApi + ?Sized,
{
    let specs = prompts::ticket_prompt_specs(config);
    let state = PromptRunner::new(prompts::initial_state()).run(renderer, &specs);

    if state.is_cancelled() {
        return Ok(Outcome::Cancelled);
    }

    let request = validate_user_input(TicketRequest::from_state(&state)?);
    if !request.is_valid {
        return Ok(Outcome::EpicMismatch);
    }

    let tickets = build_ticket_specs(&request);
    if tickets.is_empty() {
        return Ok(Outcome::NoTasks);
    }

    Ok(Outcome::Created(create_tickets(api, &tickets)))
}
