//! Issue tracker port.
//!
//! The reconciler only ever talks to an [`IssueTracker`]. [`github::GitHubTracker`]
//! is the production adapter; `memory::MemoryTracker` (tests and the
//! `test-support` feature only) keeps issues in memory and records every
//! mutation, which is what the reconciliation tests assert on.
//!
//! Field edits ([`IssueTracker::update_issue`]) and state transitions
//! ([`IssueTracker::set_state`]) are separate calls. An update never opens or
//! closes an issue.

pub mod github;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// An issue as returned by the tracker. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present only when the "issue" is really a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

/// Title, body and labels to write on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

pub trait IssueTracker {
    /// One page of issues in every state. An empty page ends pagination.
    fn list_page(&self, page: u32) -> Result<Vec<Issue>>;

    /// Create a new (open) issue.
    fn create_issue(&mut self, draft: &IssueDraft) -> Result<Issue>;

    /// Replace title, body and labels. Does not change the state.
    fn update_issue(&mut self, number: u64, draft: &IssueDraft) -> Result<Issue>;

    fn set_state(&mut self, number: u64, state: IssueState) -> Result<Issue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_deserializes_github_shape() {
        let json = r#"{
            "number": 12,
            "title": "Add retry logic <!-- id: task-007 -->",
            "body": null,
            "state": "closed",
            "labels": [{"id": 1, "name": "phase-2", "color": "ededed"}],
            "user": {"login": "octocat"}
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 12);
        assert_eq!(issue.state, IssueState::Closed);
        assert_eq!(issue.body_text(), "");
        assert_eq!(issue.label_names(), vec!["phase-2"]);
        assert!(!issue.is_pull_request());
    }

    #[test]
    fn pull_request_marker() {
        let json = r#"{"number": 3, "title": "PR", "state": "open",
            "pull_request": {"url": "https://example.invalid/pulls/3"}}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.is_pull_request());
        assert!(issue.labels.is_empty());
        assert!(issue.body.is_none());
    }
}
