//! Active developer lookup for first-run setup
//!
//! Every configured project is queried independently and concurrently. A
//! project that cannot be read is logged and recorded with no developers so
//! that a flaky or inaccessible project never blocks setup.

use std::collections::BTreeMap;
use std::thread;

use crate::config::{ActiveDeveloper, AppConfig};
use crate::jira::{self, JiraApi, JiraUser};

impl From<JiraUser> for ActiveDeveloper {
    fn from(user: JiraUser) -> Self {
        Self {
            user: user.display_name,
            account: user.account_id,
        }
    }
}

/// Returns `config` with `active_developers_by_project` rebuilt from Jira
pub fn append_active_developers<A: JiraApi + ?Sized>(config: AppConfig, api: &A) -> AppConfig {
    let active_developers_by_project = fetch_developers_by_project(&config.jira_projects, api)
        .into_iter()
        .map(|(project, users)| {
            let developers = users.into_iter().map(ActiveDeveloper::from).collect();
            (project, developers)
        })
        .collect();

    AppConfig {
        active_developers_by_project,
        ..config
    }
}

fn fetch_developers_by_project<A: JiraApi + ?Sized>(
    projects: &[String],
    api: &A,
) -> BTreeMap<String, Vec<JiraUser>> {
    thread::scope(|scope| {
        let handles: Vec<_> = projects
            .iter()
            .map(|project| {
                let handle = scope.spawn(move || jira::get_active_developers(api, project));
                (project, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(project, handle)| {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

                let users = match outcome {
                    Ok(users) => users,
                    Err(err) => {
                        tracing::warn!(
                            project = %project,
                            error = %err.detail(),
                            "Could not fetch active developers for project during setup"
                        );
                        Vec::new()
                    }
                };
                (project.clone(), users)
            })
            .collect()
    })
}
