use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const CRITERIA_HEADING: &str = "**Acceptance Criteria**";
pub const CRITERIA_SECTION: &str = "## Acceptance Criteria";

const UNCHECKED: &str = "- [ ]";

/// One `TODO:` block lifted out of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub checklist: Vec<String>,
    pub body: String,
    pub all_completed: bool,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, checklist: Vec<String>) -> Self {
        let body = if checklist.is_empty() {
            String::new()
        } else {
            format!("{CRITERIA_SECTION}\n{}", checklist.join("\n"))
        };
        let all_completed =
            !checklist.is_empty() && !checklist.iter().any(|l| l.starts_with(UNCHECKED));
        Self {
            id: id.into(),
            title: title.into(),
            checklist,
            body,
            all_completed,
        }
    }

    /// `(done, total)` checklist counts.
    pub fn progress(&self) -> (usize, usize) {
        let open = self
            .checklist
            .iter()
            .filter(|l| l.starts_with(UNCHECKED))
            .count();
        (self.checklist.len() - open, self.checklist.len())
    }
}

// ---------------------------------------------------------------------------
// Line scanner
// ---------------------------------------------------------------------------

static HEADER_RE: OnceLock<Regex> = OnceLock::new();

fn header_re() -> &'static Regex {
    HEADER_RE
        .get_or_init(|| Regex::new(r"^TODO: (.*?) <!-- id: (task-\d{3}) -->$").unwrap())
}

/// Scan `text` for task blocks, in document order.
///
/// A block is a header line
///
/// ```text
/// TODO: <title> <!-- id: task-NNN -->
/// ```
///
/// terminated by a newline, optionally followed on the very next line by the
/// `**Acceptance Criteria**` heading and one or more `- [ ] ...` / `- [x] ...`
/// lines. Blank lines may separate the heading from the first checklist line;
/// the checklist ends at the first line that is not a checklist line. Anything
/// else in the text is ignored.
pub fn extract_tasks(text: &str) -> Vec<TaskRecord> {
    let segments: Vec<&str> = text.split('\n').collect();
    // The final segment has no newline after it, so it can never hold a header.
    let terminated = segments.len().saturating_sub(1);
    let lines: Vec<&str> = segments
        .into_iter()
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .collect();

    let mut tasks = Vec::new();
    let mut i = 0;
    while i < terminated {
        let Some((title, id)) = parse_header(lines[i]) else {
            i += 1;
            continue;
        };
        let (checklist, next) = parse_criteria(&lines, i + 1);
        tasks.push(TaskRecord::new(id, title, checklist));
        i = next;
    }
    tasks
}

fn parse_header(line: &str) -> Option<(&str, &str)> {
    let caps = header_re().captures(line)?;
    let title = caps.get(1)?.as_str().trim();
    let id = caps.get(2)?.as_str();
    Some((title, id))
}

/// Consume an optional criteria section starting at `start`.
///
/// Returns the checklist and the index of the first line not consumed. When no
/// checklist follows the heading the heading is not consumed either.
fn parse_criteria(lines: &[&str], start: usize) -> (Vec<String>, usize) {
    let Some(heading) = lines.get(start) else {
        return (Vec::new(), start);
    };
    if heading.trim_end() != CRITERIA_HEADING {
        return (Vec::new(), start);
    }

    let mut i = start + 1;
    while lines.get(i).is_some_and(|l| l.trim().is_empty()) {
        i += 1;
    }

    let mut checklist = Vec::new();
    while let Some(line) = lines.get(i).filter(|l| is_checklist_line(l)) {
        checklist.push(line.trim().to_string());
        i += 1;
    }

    if checklist.is_empty() {
        (checklist, start)
    } else {
        (checklist, i)
    }
}

fn is_checklist_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("- [") else {
        return false;
    };
    let mut chars = rest.chars();
    let mark = chars.next();
    if !matches!(mark, Some(' ' | 'x' | 'X')) {
        return false;
    }
    chars
        .as_str()
        .strip_prefix("] ")
        .is_some_and(|text| !text.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
