//! External collaborators of the dialogue engine: the diagnosis service
//! and the document store, behind async traits so sessions can hold them as
//! `Arc<dyn _>` and tests can substitute doubles.

pub mod client;
pub mod documents;
pub mod mock;

pub use client::HttpDiagnosisClient;
pub use documents::SqliteDocumentStore;
pub use mock::{FailingDiagnosis, InMemoryDocuments, StaticDiagnosis};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Condition, HealthDocument, Sex};

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Diagnosis service unreachable: {0}")]
    Connection(String),

    #[error("Diagnosis call timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Diagnosis API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Diagnosis API reported failure: {0}")]
    Unsuccessful(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// One symptom as sent to the diagnosis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub name: String,
    /// 2 (low) to 4 (high).
    pub severity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub evidence: Vec<Evidence>,
    pub age: u16,
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub text: String,
}

/// Parsed diagnosis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    /// Most likely first.
    pub conditions: Vec<Condition>,
    pub question: Option<FollowUpQuestion>,
    pub confidence: f32,
}

impl DiagnosisResult {
    pub fn highest_probability(&self) -> Option<f32> {
        self.conditions
            .iter()
            .map(|c| c.probability)
            .fold(None, |max, p| Some(max.map_or(p, |m: f32| m.max(p))))
    }
}

#[async_trait]
pub trait DiagnosisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<DiagnosisResult, DiagnosisError>;
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Up to `limit` documents for `user_id`, newest first.
    async fn fetch_documents(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthDocument>, DiagnosisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(name: &str, probability: f32) -> Condition {
        Condition {
            name: name.into(),
            probability,
        }
    }

    #[test]
    fn highest_probability_across_conditions() {
        let result = DiagnosisResult {
            conditions: vec![condition("Migraine", 0.35), condition("Tension headache", 0.62)],
            question: None,
            confidence: 0.62,
        };
        assert_eq!(result.highest_probability(), Some(0.62));
    }

    #[test]
    fn highest_probability_none_without_conditions() {
        let result = DiagnosisResult {
            conditions: vec![],
            question: None,
            confidence: 0.0,
        };
        assert_eq!(result.highest_probability(), None);
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(
            DiagnosisError::Timeout(10).to_string(),
            "Diagnosis call timed out after 10s"
        );
        let api = DiagnosisError::Api {
            status: 500,
            body: "boom".into(),
        };
        assert!(api.to_string().contains("500"));
    }
}
