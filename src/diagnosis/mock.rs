//! In-process stand-ins for the diagnosis service and document store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{AnalysisRequest, DiagnosisError, DiagnosisResult, DiagnosisService, DocumentSource};
use crate::models::HealthDocument;

/// Diagnosis service returning queued results, repeating the last one.
///
/// Records every request so callers can assert on the evidence sent.
pub struct StaticDiagnosis {
    results: Mutex<Vec<DiagnosisResult>>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl StaticDiagnosis {
    pub fn new(result: DiagnosisResult) -> Self {
        Self::sequence(vec![result])
    }

    /// Results handed out in order; the last one repeats.
    pub fn sequence(results: Vec<DiagnosisResult>) -> Self {
        Self {
            results: Mutex::new(results),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle on the requests received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<AnalysisRequest>>> {
        self.requests.clone()
    }

    fn next_result(&self) -> Result<DiagnosisResult, DiagnosisError> {
        let mut results = self
            .results
            .lock()
            .map_err(|_| DiagnosisError::TaskFailed("static diagnosis lock poisoned".into()))?;
        match results.len() {
            0 => Err(DiagnosisError::Unsuccessful("no result configured".into())),
            1 => Ok(results[0].clone()),
            _ => Ok(results.remove(0)),
        }
    }
}

#[async_trait]
impl DiagnosisService for StaticDiagnosis {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<DiagnosisResult, DiagnosisError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_result()
    }
}

/// Diagnosis service that always fails.
#[derive(Default)]
pub struct FailingDiagnosis {
    calls: AtomicUsize,
}

impl FailingDiagnosis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiagnosisService for FailingDiagnosis {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<DiagnosisResult, DiagnosisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DiagnosisError::Connection("diagnosis service offline".into()))
    }
}

/// Document store backed by a fixed list, assumed newest first.
#[derive(Default)]
pub struct InMemoryDocuments {
    documents: Vec<HealthDocument>,
    fail: bool,
    calls: AtomicUsize,
}

impl InMemoryDocuments {
    pub fn new(documents: Vec<HealthDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A store whose every fetch fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocuments {
    async fn fetch_documents(
        &self,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthDocument>, DiagnosisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DiagnosisError::Connection("document store offline".into()));
        }
        Ok(self.documents.iter().take(limit).cloned().collect())
    }
}
