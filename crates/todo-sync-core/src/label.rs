use regex::Regex;
use std::sync::OnceLock;

pub const OPTIONAL_LABEL: &str = "optional";
pub const UNLABELED: &str = "unlabeled";

static PHASE_RE: OnceLock<Regex> = OnceLock::new();

fn phase_re() -> &'static Regex {
    PHASE_RE.get_or_init(|| Regex::new(r"Phase (\d)").unwrap())
}

/// Derive the single label applied to a task's issue from its title.
///
/// `Phase <d>` anywhere in the title wins and yields `phase-<d>` (first digit
/// only, so `Phase 12` maps to `phase-1`). Otherwise a title mentioning
/// `Optional` is labelled `optional`, and everything else `unlabeled`.
pub fn determine_phase_label(title: &str) -> String {
    if let Some(digit) = phase_re().captures(title).and_then(|c| c.get(1)) {
        return format!("phase-{}", digit.as_str());
    }
    if title.contains("Optional") {
        return OPTIONAL_LABEL.to_string();
    }
    UNLABELED.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_number_becomes_label() {
        assert_eq!(determine_phase_label("Phase 2: wire up auth"), "phase-2");
        assert_eq!(determine_phase_label("Cleanup (Phase 0)"), "phase-0");
    }

    #[test]
    fn phase_beats_optional() {
        assert_eq!(determine_phase_label("Optional Phase 3 polish"), "phase-3");
    }

    #[test]
    fn optional_without_phase() {
        assert_eq!(determine_phase_label("Optional: dark mode"), "optional");
    }

    #[test]
    fn fallback_is_unlabeled() {
        assert_eq!(determine_phase_label("Add retry logic"), "unlabeled");
        // Matching is case-sensitive.
        assert_eq!(determine_phase_label("phase 2 optional"), "unlabeled");
        assert_eq!(determine_phase_label("Phase two"), "unlabeled");
    }
}
