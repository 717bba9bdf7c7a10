//! Turns one raw utterance into structured fields.
//!
//! Each matcher is an independent pure function over lower-cased text;
//! [`extract`] runs them all and merges the results. Pattern tables live in
//! [`patterns`].

pub mod patterns;
pub mod sanitize;
pub mod profile;
pub mod symptoms;
pub mod modifiers;
pub mod intent;
pub mod voice;

pub use intent::{classify_intent, is_document_request};
pub use modifiers::{detect_severity, extract_duration};
pub use profile::{extract_age, extract_sex};
pub use sanitize::{sanitize_user_message, SanitizedInput};
pub use symptoms::extract_symptoms;
pub use voice::detect_spoken_symptoms;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Intent, Severity, Sex};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("Message too long: {actual} characters (max {max})")]
    InputTooLong { max: usize, actual: usize },
}

/// Structured reading of a single utterance. Recomputed every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub age: Option<u16>,
    pub sex: Option<Sex>,
    pub symptoms: Vec<String>,
    /// Stated severity, or medium when none was stated.
    pub severity: Severity,
    /// Whether `severity` came from a keyword rather than the default.
    pub severity_stated: bool,
    pub duration: Option<String>,
    pub intent: Intent,
}

impl ExtractionResult {
    pub fn has_profile_info(&self) -> bool {
        self.age.is_some() || self.sex.is_some()
    }
}

/// Run every matcher over `text`. Never fails; absent fields are `None`.
pub fn extract(text: &str) -> ExtractionResult {
    let lower = text.to_lowercase();
    let stated = detect_severity(&lower);

    ExtractionResult {
        age: extract_age(&lower),
        sex: extract_sex(&lower),
        symptoms: extract_symptoms(&lower),
        severity: stated.unwrap_or_default(),
        severity_stated: stated.is_some(),
        duration: extract_duration(&lower),
        intent: classify_intent(&lower),
    }
}

/// Sanitize then extract. Fails only on blank or overlong input.
pub fn extract_message(raw: &str, max_chars: usize) -> Result<ExtractionResult, ExtractionError> {
    let sanitized = sanitize_user_message(raw, max_chars)?;
    if sanitized.was_modified {
        tracing::debug!("Stripped invisible/control characters from user message");
    }
    Ok(extract(&sanitized.text))
}
