use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Embedded id marker
// ---------------------------------------------------------------------------
//
// Every issue the sync creates carries `<!-- id: task-NNN -->` in its title and
// body. The body copy is the only durable link between a task block and its
// issue across runs.

/// Trailing fragment left on issue titles by an older, broken renderer.
/// Issues whose title ends with it are never indexed.
pub const CORRUPT_TITLE_SUFFIX: &str = "<!-- ";

static MARKER_RE: OnceLock<Regex> = OnceLock::new();
static TASK_ID_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"<!-- id: (task-\d{3}) -->").unwrap())
}

fn task_id_re() -> &'static Regex {
    TASK_ID_RE.get_or_init(|| Regex::new(r"^task-\d{3}$").unwrap())
}

/// Render the marker comment for `task_id`.
pub fn id_comment(task_id: &str) -> String {
    format!("<!-- id: {task_id} -->")
}

/// Return the last task id marker found in `text`.
///
/// Rendered bodies end with their own marker, so any marker quoted earlier in
/// the checklist text never decides which task the issue belongs to.
pub fn find_task_id(text: &str) -> Option<&str> {
    marker_re()
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn is_task_id(candidate: &str) -> bool {
    task_id_re().is_match(candidate)
}

pub fn has_corrupt_title(title: &str) -> bool {
    title.ends_with(CORRUPT_TITLE_SUFFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_round_trips_through_find() {
        let body = format!("## Acceptance Criteria\n- [ ] a\n\n{}", id_comment("task-042"));
        assert_eq!(find_task_id(&body), Some("task-042"));
    }

    #[test]
    fn find_requires_three_digits() {
        assert_eq!(find_task_id("<!-- id: task-42 -->"), None);
        assert_eq!(find_task_id("<!-- id: task-4200 -->"), None);
        assert_eq!(find_task_id("no marker here"), None);
    }

    #[test]
    fn find_returns_trailing_marker() {
        let body = "<!-- id: task-001 --> and <!-- id: task-002 -->";
        assert_eq!(find_task_id(body), Some("task-002"));

        let body = format!("- [ ] Unblocks <!-- id: task-008 -->\n\n{}", id_comment("task-007"));
        assert_eq!(find_task_id(&body), Some("task-007"));
    }

    #[test]
    fn task_id_shape() {
        for ok in ["task-000", "task-007", "task-999"] {
            assert!(is_task_id(ok), "expected valid: {ok}");
        }
        for bad in ["task-1", "task-1234", "Task-001", "task_001", ""] {
            assert!(!is_task_id(bad), "expected invalid: {bad}");
        }
    }

    #[test]
    fn corrupt_title_detection() {
        assert!(has_corrupt_title("Add retry logic <!-- "));
        assert!(!has_corrupt_title("Add retry logic <!-- id: task-007 -->"));
    }
}
