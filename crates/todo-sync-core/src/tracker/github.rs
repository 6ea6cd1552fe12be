//! GitHub Issues adapter (REST v3, blocking).

use super::{Issue, IssueDraft, IssueState, IssueTracker};
use crate::config::TrackerConfig;
use crate::error::{Result, SyncError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("todo-sync/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

pub struct GitHubTracker {
    client: Client,
    config: TrackerConfig,
}

impl GitHubTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    pub fn repository(&self) -> &str {
        &self.config.repository
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/issues",
            self.config.api_url, self.config.repository
        )
    }

    fn issue_url(&self, number: u64) -> String {
        format!("{}/{number}", self.issues_url())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: String) -> Result<T> {
        let response = request.send()?;
        let response = check_status(response, context)?;
        Ok(response.json()?)
    }
}

/// Turn any non-2xx response into [`SyncError::Api`], keeping the body for the message.
fn check_status(response: Response, context: String) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(SyncError::Api {
        context,
        status: status.as_u16(),
        body,
    })
}

impl IssueTracker for GitHubTracker {
    fn list_page(&self, page: u32) -> Result<Vec<Issue>> {
        let per_page = self.config.per_page.to_string();
        let page_param = page.to_string();
        let request = self.request(Method::GET, &self.issues_url()).query(&[
            ("state", "all"),
            ("per_page", per_page.as_str()),
            ("page", page_param.as_str()),
        ]);
        let issues: Vec<Issue> = self.send(request, format!("listing issues page {page}"))?;
        tracing::debug!(page, count = issues.len(), "fetched issue page");
        Ok(issues)
    }

    fn create_issue(&mut self, draft: &IssueDraft) -> Result<Issue> {
        let request = self.request(Method::POST, &self.issues_url()).json(draft);
        self.send(request, format!("creating issue '{}'", draft.title))
    }

    fn update_issue(&mut self, number: u64, draft: &IssueDraft) -> Result<Issue> {
        let request = self
            .request(Method::PATCH, &self.issue_url(number))
            .json(draft);
        self.send(request, format!("updating issue #{number}"))
    }

    fn set_state(&mut self, number: u64, state: IssueState) -> Result<Issue> {
        let request = self
            .request(Method::PATCH, &self.issue_url(number))
            .json(&serde_json::json!({ "state": state }));
        self.send(request, format!("setting issue #{number} {state}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
