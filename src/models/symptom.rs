use serde::{Deserialize, Serialize};

use super::enums::Severity;

/// Ordered symptom list that never holds two case-insensitively equal entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomList(Vec<String>);

impl SymptomList {
    /// Append unless an equal entry (ignoring case) exists. Returns whether it was added.
    pub fn push(&mut self, symptom: &str) -> bool {
        let trimmed = symptom.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.0.push(trimmed.to_string());
        true
    }

    /// Append each entry in order, returning the ones that were actually new.
    pub fn extend_new<'a, I>(&mut self, symptoms: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        symptoms
            .into_iter()
            .filter(|s| self.push(s))
            .cloned()
            .collect()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        let needle = symptom.trim().to_lowercase();
        self.0.iter().any(|s| s.to_lowercase() == needle)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// "a, b, c" as shown in assistant replies.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

/// A yes/no answer given to a follow-up question from the diagnosis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswer {
    pub question: String,
    pub answer: bool,
}

/// Auxiliary facts gathered alongside the symptom list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomContext {
    pub severity: Option<Severity>,
    /// Verbatim duration span, e.g. "for 3 days".
    pub duration: Option<String>,
    /// Follow-up question outstanding while in clarification.
    pub pending_question: Option<String>,
    pub clarifications: Vec<ClarificationAnswer>,
}

impl SymptomContext {
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }
}
