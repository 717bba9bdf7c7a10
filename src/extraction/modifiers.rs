use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{word_alternation, DURATION_UNITS, SEVERITY_LEVELS};
use crate::models::Severity;

static SEVERITY_PATTERNS: LazyLock<Vec<(Severity, Regex)>> = LazyLock::new(|| {
    SEVERITY_LEVELS
        .iter()
        .map(|(level, words)| {
            (
                *level,
                Regex::new(&word_alternation(words)).expect("Invalid severity regex"),
            )
        })
        .collect()
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    let units = DURATION_UNITS.join("|");
    Regex::new(&format!(r"\b(?:for\s+)?\d+\s+(?:{units})s?\b")).expect("Invalid duration regex")
});

/// Severity stated in the text, if any.
///
/// Every level is tested in table order and the last match wins, so
/// "severe but only mild at night" resolves to high.
pub fn detect_severity(lower: &str) -> Option<Severity> {
    let mut severity = None;
    for (level, re) in SEVERITY_PATTERNS.iter() {
        if re.is_match(lower) {
            severity = Some(*level);
        }
    }
    severity
}

/// First duration span, returned verbatim (e.g. "for 3 days").
pub fn extract_duration(lower: &str) -> Option<String> {
    DURATION.find(lower).map(|m| m.as_str().to_string())
}
