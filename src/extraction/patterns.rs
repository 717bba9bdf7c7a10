//! Word tables behind every matcher. Matchers compile these into regexes;
//! auditing the extraction grammar means reading this file.

use crate::models::Severity;

/// Phrases that introduce a free-text symptom description.
/// Longer phrases come first so alternation prefers them.
pub const SYMPTOM_TRIGGERS: &[&str] = &[
    "i've been having",
    "i have",
    "experiencing",
    "suffering from",
    "feeling",
];

/// Words that introduce a body part in "my X hurts".
pub const POSSESSIVES: &[&str] = &["my", "the"];

/// Verbs closing a body-part complaint.
pub const BODY_PART_VERBS: &[&str] = &["hurts", "aches", "pains", "is sore", "feels", "bothers"];

/// Articles dropped from captured spans ("a headache" → "headache").
pub const FILLER_WORDS: &[&str] = &["a", "an", "some"];

/// Closed vocabulary matched literally anywhere in the text.
pub const KNOWN_SYMPTOMS: &[&str] = &[
    "headache",
    "fever",
    "cough",
    "nausea",
    "vomiting",
    "diarrhea",
    "dizziness",
    "dizzy",
    "fatigue",
    "tired",
    "chills",
    "rash",
    "congestion",
    "chest pain",
    "stomach ache",
    "back pain",
    "sore throat",
    "runny nose",
    "shortness of breath",
    "difficulty breathing",
];

/// Severity keyword sets in evaluation order. The last set that matches wins,
/// so the most urgent stated severity is listed last.
pub const SEVERITY_LEVELS: &[(Severity, &[&str])] = &[
    (Severity::Low, &["mild", "slight", "minor", "little", "light"]),
    (
        Severity::Medium,
        &["moderate", "noticeable", "bothersome", "uncomfortable", "bad"],
    ),
    (
        Severity::High,
        &[
            "severe",
            "terrible",
            "excruciating",
            "unbearable",
            "intense",
            "sharp",
            "extreme",
            "worst",
        ],
    ),
];

/// Units accepted by the duration matcher (plural `s` is optional).
pub const DURATION_UNITS: &[&str] = &["minute", "hour", "day", "week", "month"];

pub const GREETING_WORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Bare "right" is left out: it is usually a side ("my right knee").
pub const CONFIRMATION_WORDS: &[&str] = &["yes", "yeah", "yep", "correct", "that's right"];

pub const DENIAL_WORDS: &[&str] = &["no", "nope", "incorrect", "wrong", "not really"];

/// A yes/no word directly after one of these does not count.
pub const NEGATORS: &[&str] = &["not", "don't", "dont", "never"];

pub const HELP_WORDS: &[&str] = &["help", "what should i do", "advice", "recommend"];

pub const SYMPTOM_WORDS: &[&str] = &[
    "pain", "hurt", "hurts", "ache", "aches", "sick", "ill", "symptom", "symptoms",
];

/// Mentions of stored records that switch a turn to the document summary.
/// Each also matches with a trailing `s`.
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "document", "record", "history", "report", "past", "previous", "uploaded", "file",
];

/// Keywords picked out of voice transcripts, in reporting order.
pub const SPOKEN_SYMPTOM_KEYWORDS: &[&str] = &[
    "pain", "ache", "headache", "fever", "cough", "nausea", "dizzy", "tired", "fatigue",
];

/// Build `\b(?:w1|w2|...)\b` from a word table, longest entries first.
pub fn word_alternation(words: &[&str]) -> String {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let body = sorted
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"\b(?:{body})\b")
}
