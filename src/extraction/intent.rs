use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{
    word_alternation, CONFIRMATION_WORDS, DENIAL_WORDS, DOCUMENT_KEYWORDS, GREETING_WORDS,
    HELP_WORDS, NEGATORS, SYMPTOM_WORDS,
};
use super::profile::{extract_age, extract_sex};
use crate::models::Intent;

/// Waterfall tested top to bottom; first match wins.
static INTENT_WATERFALL: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    [
        (Intent::Greeting, GREETING_WORDS),
        (Intent::Confirmation, CONFIRMATION_WORDS),
        (Intent::Denial, DENIAL_WORDS),
        (Intent::SeekingHelp, HELP_WORDS),
        (Intent::SymptomReport, SYMPTOM_WORDS),
    ]
    .into_iter()
    .map(|(intent, words)| {
        (
            intent,
            Regex::new(&word_alternation(words)).expect("Invalid intent regex"),
        )
    })
    .collect()
});

static DOCUMENT_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    let words = DOCUMENT_KEYWORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{words})s?\b")).expect("Invalid document keyword regex")
});

/// Classify lower-cased text into an intent.
pub fn classify_intent(lower: &str) -> Intent {
    let hit = INTENT_WATERFALL.iter().find(|(intent, re)| {
        if intent.is_yes_no() {
            re.find_iter(lower).any(|m| !follows_negator(&lower[..m.start()]))
        } else {
            re.is_match(lower)
        }
    });
    if let Some((intent, _)) = hit {
        return *intent;
    }
    if extract_age(lower).is_some() || extract_sex(lower).is_some() {
        return Intent::ProfileInfo;
    }
    Intent::General
}

/// Whether the last word of `before` is a negator.
fn follows_negator(before: &str) -> bool {
    before
        .split_whitespace()
        .next_back()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .is_some_and(|w| NEGATORS.contains(&w))
}

/// Whether the text asks about stored documents, records or history.
pub fn is_document_request(lower: &str) -> bool {
    DOCUMENT_REQUEST.is_match(lower)
}
