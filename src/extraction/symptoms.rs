use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{
    word_alternation, BODY_PART_VERBS, FILLER_WORDS, KNOWN_SYMPTOMS, POSSESSIVES, SYMPTOM_TRIGGERS,
};

/// Captured spans shorter than this (after cleanup) are dropped.
const MIN_SYMPTOM_CHARS: usize = 3;

/// Family 1, "i have X.": text after a trigger phrase up to the sentence boundary.
static TRIGGER_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    let triggers = SYMPTOM_TRIGGERS
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{triggers})\s+(.*?)(?:[.!?\n]|$)"))
        .expect("Invalid trigger phrase regex")
});

/// Family 2, "my X hurts": the body part between possessive and verb.
static BODY_PART_COMPLAINT: LazyLock<Regex> = LazyLock::new(|| {
    let possessives = POSSESSIVES.join("|");
    let verbs = BODY_PART_VERBS
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{possessives})\s+(.+?)\s+(?:{verbs})\b"))
        .expect("Invalid body part regex")
});

/// Family 3: closed vocabulary anywhere in the text.
static KNOWN_SYMPTOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&word_alternation(KNOWN_SYMPTOMS)).expect("Invalid symptom vocabulary regex")
});

/// Every trigger, possessive, verb and filler word removed from captured spans.
static STRIP_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    let all: Vec<&str> = SYMPTOM_TRIGGERS
        .iter()
        .chain(POSSESSIVES)
        .chain(BODY_PART_VERBS)
        .chain(FILLER_WORDS)
        .copied()
        .collect();
    Regex::new(&word_alternation(&all)).expect("Invalid strip-word regex")
});

/// Extract symptom phrases from lower-cased text.
///
/// Families run in order (trigger phrases, body-part complaints, vocabulary);
/// within a family, matches are emitted in text order. Duplicates within the
/// utterance are dropped.
pub fn extract_symptoms(lower: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    let trigger_spans = TRIGGER_PHRASE
        .captures_iter(lower)
        .filter_map(|c| c.get(1).map(|m| m.as_str()));
    let body_spans = BODY_PART_COMPLAINT
        .captures_iter(lower)
        .filter_map(|c| c.get(1).map(|m| m.as_str()));
    let vocabulary = KNOWN_SYMPTOM.find_iter(lower).map(|m| m.as_str());

    for span in trigger_spans.chain(body_spans).chain(vocabulary) {
        let cleaned = clean_span(span);
        if cleaned.chars().count() < MIN_SYMPTOM_CHARS {
            continue;
        }
        if !found.iter().any(|s| s.eq_ignore_ascii_case(&cleaned)) {
            found.push(cleaned);
        }
    }

    found
}

/// Drop strip words, collapse whitespace, trim trailing punctuation.
fn clean_span(span: &str) -> String {
    let stripped = STRIP_WORDS.replace_all(span, " ");
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == ';' || c == ':')
        .trim()
        .to_string()
}
