use crate::error::Result;
use crate::marker;
use crate::tracker::{Issue, IssueTracker};
use std::collections::BTreeMap;

/// Existing issues keyed by the task id embedded in their body.
#[derive(Debug, Clone, Default)]
pub struct RemoteIndex {
    by_task: BTreeMap<String, Issue>,
}

impl RemoteIndex {
    /// Page through every issue (open and closed) until an empty page.
    pub fn fetch<T: IssueTracker + ?Sized>(tracker: &T) -> Result<Self> {
        let mut index = Self::default();
        let mut page = 1;
        loop {
            let issues = tracker.list_page(page)?;
            if issues.is_empty() {
                break;
            }
            for issue in issues {
                index.insert(issue);
            }
            page += 1;
        }
        tracing::debug!(pages = page - 1, tracked = index.len(), "built remote index");
        Ok(index)
    }

    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let mut index = Self::default();
        for issue in issues {
            index.insert(issue);
        }
        index
    }

    /// Register `issue` under its task id, if it is a tracked issue.
    ///
    /// When two issues carry the same id the lower issue number wins, whatever
    /// order the pages arrived in.
    fn insert(&mut self, issue: Issue) {
        if issue.is_pull_request() {
            return;
        }
        if marker::has_corrupt_title(&issue.title) {
            tracing::debug!(number = issue.number, "skipping issue with truncated title");
            return;
        }
        let Some(task_id) = marker::find_task_id(issue.body_text()).map(str::to_string) else {
            tracing::debug!(number = issue.number, "untracked issue");
            return;
        };

        match self.by_task.get(&task_id).map(|kept| kept.number) {
            Some(kept) if kept <= issue.number => {
                tracing::warn!(
                    task = %task_id,
                    kept,
                    ignored = issue.number,
                    "duplicate issue for task"
                );
            }
            Some(replaced) => {
                tracing::warn!(
                    task = %task_id,
                    kept = issue.number,
                    ignored = replaced,
                    "duplicate issue for task"
                );
                self.by_task.insert(task_id, issue);
            }
            None => {
                self.by_task.insert(task_id, issue);
            }
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&Issue> {
        self.by_task.get(task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.by_task.contains_key(task_id)
    }

    pub fn len(&self) -> usize {
        self.by_task.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_task.is_empty()
    }

    /// Tracked issues in task-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Issue)> {
        self.by_task.iter().map(|(id, issue)| (id.as_str(), issue))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::memory::MemoryTracker;
    use crate::tracker::IssueState;

    fn issue(number: u64, title: &str, body: Option<&str>) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            body: body.map(str::to_string),
            state: IssueState::Open,
            labels: Vec::new(),
            pull_request: None,
        }
    }

    #[test]
    fn indexes_only_marked_issues() {
        let index = RemoteIndex::from_issues(vec![
            issue(1, "Tracked", Some("x\n\n<!-- id: task-001 -->")),
            issue(2, "Manual bug report", Some("steps to reproduce")),
            issue(3, "No body", None),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("task-001").unwrap().number, 1);
        assert!(!index.contains("task-002"));
    }

    #[test]
    fn skips_truncated_titles() {
        let index = RemoteIndex::from_issues(vec![issue(
            1,
            "Broken <!-- ",
            Some("<!-- id: task-001 -->"),
        )]);
        assert!(index.is_empty());
    }

    #[test]
    fn skips_pull_requests() {
        let mut pr = issue(5, "PR", Some("closes <!-- id: task-005 -->"));
        pr.pull_request = Some(serde_json::json!({}));
        assert!(RemoteIndex::from_issues(vec![pr]).is_empty());
    }

    #[test]
    fn duplicate_ids_keep_lowest_number() {
        let forward = RemoteIndex::from_issues(vec![
            issue(4, "a", Some("<!-- id: task-001 -->")),
            issue(9, "b", Some("<!-- id: task-001 -->")),
        ]);
        let reverse = RemoteIndex::from_issues(vec![
            issue(9, "b", Some("<!-- id: task-001 -->")),
            issue(4, "a", Some("<!-- id: task-001 -->")),
        ]);
        assert_eq!(forward.get("task-001").unwrap().number, 4);
        assert_eq!(reverse.get("task-001").unwrap().number, 4);
    }

    #[test]
    fn fetch_walks_every_page() {
        let issues: Vec<Issue> = (1..=5)
            .map(|n| issue(n, "t", Some(&format!("<!-- id: task-{n:03} -->"))))
            .collect();
        let tracker = MemoryTracker::new(issues).with_page_size(2);
        let index = RemoteIndex::fetch(&tracker).unwrap();
        assert_eq!(index.len(), 5);
        let ids: Vec<&str> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec!["task-001", "task-002", "task-003", "task-004", "task-005"]
        );
    }

    #[test]
    fn fetch_empty_tracker() {
        let index = RemoteIndex::fetch(&MemoryTracker::default()).unwrap();
        assert!(index.is_empty());
    }
}
