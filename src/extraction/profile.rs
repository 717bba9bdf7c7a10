use std::sync::LazyLock;

use regex::Regex;

use crate::models::Sex;

/// Ages above this are treated as not stated.
pub const MAX_PLAUSIBLE_AGE: u16 = 120;

/// Tried in order; the first pattern that captures wins.
static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(?:i am|i'm|im|age|aged)\s*:?\s*(\d{1,3})\b").expect("Invalid age regex"),
        Regex::new(r"\b(\d{1,3})\s*(?:-\s*)?(?:years?\s*old|yrs?\s*old|y/o|yo)\b")
            .expect("Invalid age regex"),
    ]
});

static SEX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(?:i am|i'm|im)\s+(?:a\s+)?(male|female|man|woman)\b")
            .expect("Invalid sex regex"),
        Regex::new(r"\b(male|female|man|woman)\b").expect("Invalid sex regex"),
    ]
});

/// Extract a stated age from lower-cased text.
pub fn extract_age(lower: &str) -> Option<u16> {
    let digits = AGE_PATTERNS
        .iter()
        .find_map(|re| re.captures(lower).and_then(|c| c.get(1)))?;
    let age: u16 = digits.as_str().parse().ok()?;
    if age > MAX_PLAUSIBLE_AGE {
        tracing::debug!(age, "Discarding implausible age");
        return None;
    }
    Some(age)
}

/// Extract a stated sex from lower-cased text. "man"/"woman" normalize to male/female.
pub fn extract_sex(lower: &str) -> Option<Sex> {
    let word = SEX_PATTERNS
        .iter()
        .find_map(|re| re.captures(lower).and_then(|c| c.get(1)))?;
    match word.as_str() {
        "male" | "man" => Some(Sex::Male),
        "female" | "woman" => Some(Sex::Female),
        _ => None,
    }
}
