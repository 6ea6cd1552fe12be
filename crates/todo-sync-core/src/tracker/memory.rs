//! In-memory tracker that records every mutation.

use super::{Issue, IssueDraft, IssueState, IssueTracker, Label};
use crate::error::{Result, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    Create { title: String },
    Update { number: u64 },
    SetState { number: u64, state: IssueState },
}

#[derive(Debug)]
pub struct MemoryTracker {
    issues: Vec<Issue>,
    per_page: usize,
    calls: Vec<TrackerCall>,
    next_number: u64,
    /// Fail the nth mutation (0-based) with a 500, for abort tests.
    fail_on_call: Option<usize>,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryTracker {
    pub fn new(issues: Vec<Issue>) -> Self {
        let next_number = issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        Self {
            issues,
            per_page: 100,
            calls: Vec::new(),
            next_number,
            fail_on_call: None,
        }
    }

    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn fail_on_call(mut self, index: usize) -> Self {
        self.fail_on_call = Some(index);
        self
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue(&self, number: u64) -> Option<&Issue> {
        self.issues.iter().find(|i| i.number == number)
    }

    pub fn calls(&self) -> &[TrackerCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: TrackerCall) -> Result<()> {
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(SyncError::Api {
                context: format!("{call:?}"),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        self.calls.push(call);
        Ok(())
    }

    fn find_mut(&mut self, number: u64) -> Result<&mut Issue> {
        self.issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| SyncError::Api {
                context: format!("issue #{number}"),
                status: 404,
                body: "Not Found".to_string(),
            })
    }
}

fn labels_of(draft: &IssueDraft) -> Vec<Label> {
    draft
        .labels
        .iter()
        .map(|name| Label { name: name.clone() })
        .collect()
}

impl IssueTracker for MemoryTracker {
    fn list_page(&self, page: u32) -> Result<Vec<Issue>> {
        let start = (page.max(1) as usize - 1) * self.per_page;
        Ok(self
            .issues
            .iter()
            .skip(start)
            .take(self.per_page)
            .cloned()
            .collect())
    }

    fn create_issue(&mut self, draft: &IssueDraft) -> Result<Issue> {
        self.record(TrackerCall::Create {
            title: draft.title.clone(),
        })?;
        let issue = Issue {
            number: self.next_number,
            title: draft.title.clone(),
            body: Some(draft.body.clone()),
            state: IssueState::Open,
            labels: labels_of(draft),
            pull_request: None,
        };
        self.next_number += 1;
        self.issues.push(issue.clone());
        Ok(issue)
    }

    fn update_issue(&mut self, number: u64, draft: &IssueDraft) -> Result<Issue> {
        self.find_mut(number)?;
        self.record(TrackerCall::Update { number })?;
        let issue = self.find_mut(number)?;
        issue.title = draft.title.clone();
        issue.body = Some(draft.body.clone());
        issue.labels = labels_of(draft);
        Ok(issue.clone())
    }

    fn set_state(&mut self, number: u64, state: IssueState) -> Result<Issue> {
        self.find_mut(number)?;
        self.record(TrackerCall::SetState { number, state })?;
        let issue = self.find_mut(number)?;
        issue.state = state;
        Ok(issue.clone())
    }
}
