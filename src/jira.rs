//! Jira REST access
//!
//! [`JiraApi`] is the seam between task-gen and Jira: issue creation and
//! generic resource reads. [`JiraClient`] implements it over HTTP using the
//! base URI and `email:APITOKEN` credentials from the configuration.

use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{Error, Result};

lazy_static! {
    static ref ABSOLUTE_URL: Regex = Regex::new(r"(?i)^https?://").unwrap();
}

/// Name of the project role whose members count as developers
pub const DEVELOPERS_ROLE: &str = "Developers";

/// Operations task-gen needs from Jira
pub trait JiraApi: Sync {
    /// Creates an issue from a full `/issue` payload
    fn post_issue(&self, payload: &Value) -> Result<Value>;

    /// Reads a resource; absolute URLs are used verbatim, anything else is
    /// relative to the configured REST base
    fn get_resource(&self, path_or_url: &str) -> Result<Value>;
}

/// Blocking HTTP client for the Jira REST API
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: Client,
    base_uri: String,
}

impl JiraClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.jira_base_uri.is_empty() {
            return Err(Error::Config("Jira base URI is not set".into()));
        }

        let authorization = HeaderValue::from_str(&basic_auth(&config.jira_auth))
            .map_err(|_| Error::Config("Jira auth contains invalid characters".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_uri: config.jira_base_uri.clone(),
        })
    }

    /// Full URL for a path or absolute URL
    pub fn resolve_url(&self, path_or_url: &str) -> String {
        if ABSOLUTE_URL.is_match(path_or_url) {
            return path_or_url.to_string();
        }
        format!(
            "{}/{}",
            self.base_uri.trim_end_matches('/'),
            path_or_url.trim_start_matches('/')
        )
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let detail = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(Error::JiraApi {
                status: status.as_u16(),
                detail,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl JiraApi for JiraClient {
    fn post_issue(&self, payload: &Value) -> Result<Value> {
        let url = self.resolve_url("/issue");
        tracing::debug!(%url, "POST");
        self.send(self.http.post(url).json(payload))
    }

    fn get_resource(&self, path_or_url: &str) -> Result<Value> {
        let url = self.resolve_url(path_or_url);
        tracing::debug!(%url, "GET");
        self.send(self.http.get(url))
    }
}

/// `Authorization` header value for an `email:APITOKEN` pair
pub fn basic_auth(credentials: &str) -> String {
    format!("Basic {}", STANDARD.encode(credentials))
}

/// A Jira user as returned by `/user`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JiraUser {
    #[serde(alias = "accountId")]
    pub account_id: String,
    #[serde(alias = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Deserialize)]
struct RoleActors {
    #[serde(default)]
    actors: Vec<RoleActor>,
}

#[derive(Deserialize)]
struct RoleActor {
    #[serde(alias = "actorUser")]
    actor_user: Option<ActorUser>,
}

#[derive(Deserialize)]
struct ActorUser {
    #[serde(alias = "accountId")]
    account_id: String,
}

/// Fetches the active members of a project's Developers role
///
/// Group actors are skipped. User details are fetched concurrently; any
/// failed request fails the whole project.
pub fn get_active_developers<A: JiraApi + ?Sized>(api: &A, project: &str) -> Result<Vec<JiraUser>> {
    let roles = api.get_resource(&format!("/project/{}/role", project))?;
    let role_url = roles
        .get(DEVELOPERS_ROLE)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::InvalidInput(format!("project {} has no {} role", project, DEVELOPERS_ROLE))
        })?;

    let role: RoleActors = serde_json::from_value(api.get_resource(role_url)?)?;
    let account_ids: Vec<String> = role
        .actors
        .into_iter()
        .filter_map(|actor| actor.actor_user)
        .map(|user| user.account_id)
        .collect();

    let users = thread::scope(|scope| {
        let handles: Vec<_> = account_ids
            .iter()
            .map(|account_id| scope.spawn(move || fetch_user(api, account_id)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    Ok(users.into_iter().filter(|user| user.active).collect())
}

fn fetch_user<A: JiraApi + ?Sized>(api: &A, account_id: &str) -> Result<JiraUser> {
    let user = api.get_resource(&format!("/user?accountId={}", account_id))?;
    Ok(serde_json::from_value(user)?)
}
