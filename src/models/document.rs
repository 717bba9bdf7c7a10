use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored health record as seen by the document short-circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDocument {
    pub title: String,
    pub record_type: String,
    pub date_recorded: Option<NaiveDate>,
    pub description: Option<String>,
    pub extracted_text: Option<String>,
}

impl HealthDocument {
    pub fn new(title: &str, record_type: &str) -> Self {
        Self {
            title: title.to_string(),
            record_type: record_type.to_string(),
            date_recorded: None,
            description: None,
            extracted_text: None,
        }
    }

    /// Description when present, otherwise the OCR/extracted text.
    pub fn preview_source(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.extracted_text.as_deref().filter(|t| !t.trim().is_empty()))
    }
}
