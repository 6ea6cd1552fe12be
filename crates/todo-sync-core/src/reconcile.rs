//! Converge tracker issues with the task blocks found in the documents.
//!
//! Reconciliation is split in two: [`plan`] is a pure diff of extracted tasks
//! against the [`RemoteIndex`], and [`apply`] replays the planned actions on an
//! [`IssueTracker`]. An issue that already matches its rendered title, body,
//! label and state produces no action, so a second run over unchanged input is
//! a no-op.
//!
//! | task | issue  | all_completed | actions                          |
//! |------|--------|---------------|----------------------------------|
//! | yes  | none   | false         | create                           |
//! | yes  | none   | true          | none (skipped)                   |
//! | yes  | open   | true          | update if drifted, close         |
//! | yes  | closed | false         | update if drifted, reopen        |
//! | yes  | open   | false         | update if drifted                |
//! | yes  | closed | true          | update if drifted                |
//! | no   | open   | -             | close (orphaned)                 |
//! | no   | closed | -             | none                             |

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::extract::{extract_tasks, TaskRecord};
use crate::index::RemoteIndex;
use crate::label::determine_phase_label;
use crate::marker;
use crate::tracker::github::GitHubTracker;
use crate::tracker::{Issue, IssueDraft, IssueState, IssueTracker};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every acceptance criterion is checked.
    Completed,
    /// The task block no longer exists in any document.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Create {
        task_id: String,
        draft: IssueDraft,
    },
    Update {
        task_id: String,
        number: u64,
        draft: IssueDraft,
    },
    Close {
        task_id: String,
        number: u64,
        reason: CloseReason,
    },
    Reopen {
        task_id: String,
        number: u64,
    },
}

impl Action {
    pub fn task_id(&self) -> &str {
        match self {
            Action::Create { task_id, .. }
            | Action::Update { task_id, .. }
            | Action::Close { task_id, .. }
            | Action::Reopen { task_id, .. } => task_id,
        }
    }

}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create { task_id, draft } => {
                write!(f, "Create issue for {task_id} [{}]", draft.labels.join(", "))
            }
            Action::Update {
                task_id, number, ..
            } => write!(f, "Update issue #{number} for {task_id}"),
            Action::Close {
                task_id,
                number,
                reason: CloseReason::Completed,
            } => write!(f, "Close issue #{number} for completed {task_id}"),
            Action::Close {
                task_id,
                number,
                reason: CloseReason::Removed,
            } => write!(f, "Close issue #{number} for removed {task_id}"),
            Action::Reopen { task_id, number } => {
                write!(f, "Reopen issue #{number} for {task_id}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fully checked task with no issue: nothing worth opening.
    AlreadyCompleted,
    /// A second block reusing an id seen earlier in the documents.
    DuplicateTask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub task_id: String,
    pub title: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::AlreadyCompleted => {
                write!(f, "Skip {}: already completed, no issue created", self.task_id)
            }
            SkipReason::DuplicateTask => write!(
                f,
                "Skip {} ('{}'): id already used by an earlier task",
                self.task_id, self.title
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub skipped: Vec<Skipped>,
    /// Tracked issues that already match their target state.
    pub unchanged: usize,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn created(&self) -> usize {
        self.count(|a| matches!(a, Action::Create { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|a| matches!(a, Action::Update { .. }))
    }

    pub fn closed(&self) -> usize {
        self.count(|a| matches!(a, Action::Close { .. }))
    }

    pub fn reopened(&self) -> usize {
        self.count(|a| matches!(a, Action::Reopen { .. }))
    }

    fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.actions.iter().filter(|&a| pred(a)).count()
    }

    /// "2 created, 1 updated, 0 closed, 0 reopened, 1 skipped, 4 unchanged"
    pub fn summary(&self) -> String {
        format!(
            "{} created, {} updated, {} closed, {} reopened, {} skipped, {} unchanged",
            self.created(),
            self.updated(),
            self.closed(),
            self.reopened(),
            self.skipped.len(),
            self.unchanged
        )
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Title, body and label the issue for `task` should carry.
pub fn render_draft(task: &TaskRecord) -> IssueDraft {
    let comment = marker::id_comment(&task.id);
    let title = format!("{} {comment}", task.title.trim());
    IssueDraft {
        title: title.trim_start().to_string(),
        body: format!("{}\n\n{comment}", task.body),
        labels: vec![determine_phase_label(&task.title)],
    }
}

/// True when any rendered field differs from what the tracker holds.
///
/// Titles are compared trimmed, bodies with CRLF folded to LF and outer
/// whitespace trimmed, labels as unordered sets.
pub fn needs_update(issue: &Issue, draft: &IssueDraft) -> bool {
    if issue.title.trim() != draft.title.trim() {
        return true;
    }
    let remote_body = issue.body_text().replace("\r\n", "\n");
    if remote_body.trim() != draft.body.trim() {
        return true;
    }
    let mut remote_labels = issue.label_names();
    remote_labels.sort_unstable();
    remote_labels.dedup();
    let mut wanted: Vec<&str> = draft.labels.iter().map(String::as_str).collect();
    wanted.sort_unstable();
    wanted.dedup();
    remote_labels != wanted
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Diff `tasks` (document order) against `index`.
///
/// Tasks are visited first; a repeated id is skipped and the first block wins.
/// Indexed issues whose id was not seen are then visited in id order and the
/// open ones are closed as removed.
pub fn plan(tasks: &[TaskRecord], index: &RemoteIndex) -> Plan {
    let mut out = Plan::default();
    let mut processed: HashSet<&str> = HashSet::new();

    for task in tasks {
        if !processed.insert(task.id.as_str()) {
            tracing::warn!(task = %task.id, title = %task.title, "duplicate task id, keeping the first block");
            out.skipped.push(Skipped {
                task_id: task.id.clone(),
                title: task.title.clone(),
                reason: SkipReason::DuplicateTask,
            });
            continue;
        }

        let draft = render_draft(task);
        let Some(issue) = index.get(&task.id) else {
            if task.all_completed {
                tracing::info!(task = %task.id, "task already completed, not creating an issue");
                out.skipped.push(Skipped {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    reason: SkipReason::AlreadyCompleted,
                });
            } else {
                out.actions.push(Action::Create {
                    task_id: task.id.clone(),
                    draft,
                });
            }
            continue;
        };

        let before = out.actions.len();
        if needs_update(issue, &draft) {
            out.actions.push(Action::Update {
                task_id: task.id.clone(),
                number: issue.number,
                draft,
            });
        }
        match (issue.state, task.all_completed) {
            (IssueState::Open, true) => out.actions.push(Action::Close {
                task_id: task.id.clone(),
                number: issue.number,
                reason: CloseReason::Completed,
            }),
            (IssueState::Closed, false) => out.actions.push(Action::Reopen {
                task_id: task.id.clone(),
                number: issue.number,
            }),
            _ => {}
        }
        if out.actions.len() == before {
            out.unchanged += 1;
        }
    }

    for (task_id, issue) in index.iter() {
        if processed.contains(task_id) {
            continue;
        }
        match issue.state {
            IssueState::Open => out.actions.push(Action::Close {
                task_id: task_id.to_string(),
                number: issue.number,
                reason: CloseReason::Removed,
            }),
            IssueState::Closed => out.unchanged += 1,
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Applying
// ---------------------------------------------------------------------------

/// Execute `plan` in order, stopping at the first failure.
///
/// Nothing is rolled back: actions applied before the failing one stay applied.
pub fn apply<T: IssueTracker + ?Sized>(plan: &Plan, tracker: &mut T) -> Result<()> {
    for action in &plan.actions {
        match action {
            Action::Create { task_id, draft } => {
                let issue = tracker.create_issue(draft)?;
                tracing::info!(task = %task_id, number = issue.number, "created issue");
            }
            Action::Update {
                task_id,
                number,
                draft,
            } => {
                tracker.update_issue(*number, draft)?;
                tracing::info!(task = %task_id, number, "updated issue");
            }
            Action::Close {
                task_id,
                number,
                reason,
            } => {
                tracker.set_state(*number, IssueState::Closed)?;
                match reason {
                    CloseReason::Completed => {
                        tracing::info!(task = %task_id, number, "closed issue for completed task")
                    }
                    CloseReason::Removed => {
                        tracing::info!(task = %task_id, number, "closed issue for removed task")
                    }
                }
            }
            Action::Reopen { task_id, number } => {
                tracker.set_state(*number, IssueState::Open)?;
                tracing::info!(task = %task_id, number, "reopened issue for regressed task");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Extract tasks from `text`, index the tracker and compute the plan without
/// mutating anything.
pub fn preview<T: IssueTracker + ?Sized>(text: &str, tracker: &T) -> Result<Plan> {
    let tasks = extract_tasks(text);
    let index = RemoteIndex::fetch(tracker)?;
    tracing::debug!(tasks = tasks.len(), tracked = index.len(), "planning");
    Ok(plan(&tasks, &index))
}

/// Full reconciliation of `text` against `tracker`. Returns the applied plan.
pub fn sync<T: IssueTracker + ?Sized>(text: &str, tracker: &mut T) -> Result<Plan> {
    let planned = preview(text, &*tracker)?;
    apply(&planned, tracker)?;
    Ok(planned)
}

/// [`sync`] against GitHub using `config`.
pub fn run(config: TrackerConfig, text: &str) -> Result<Plan> {
    let mut tracker = GitHubTracker::new(config)?;
    sync(text, &mut tracker)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
