use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "SymptomIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on the diagnosis call and the document fetch when no override is set.
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 10;

/// Maximum user message length in characters, measured after sanitization.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 2_000;

/// Sliding window of raw user utterances kept on the conversation state.
pub const DEFAULT_PREVIOUS_QUESTIONS_CAPACITY: usize = 5;

/// Most recent documents included in a document summary.
pub const DEFAULT_MAX_DOCUMENTS: usize = 10;

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "symptom_intake=info"
}

/// Get the application data directory.
/// ~/SymptomIntake/ on all platforms; falls back to the working directory
/// when no home directory can be resolved.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the health-record database read by the document store.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("records.db")
}

/// Runtime configuration for a chat session and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub analysis_timeout_secs: u64,
    pub max_message_chars: usize,
    pub previous_questions_capacity: usize,
    pub max_documents: usize,
    /// Endpoint of the diagnosis function. `None` runs without a remote analyzer.
    pub diagnosis_url: Option<String>,
    pub diagnosis_api_key: Option<String>,
    pub db_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis_timeout_secs: DEFAULT_ANALYSIS_TIMEOUT_SECS,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            previous_questions_capacity: DEFAULT_PREVIOUS_QUESTIONS_CAPACITY,
            max_documents: DEFAULT_MAX_DOCUMENTS,
            diagnosis_url: None,
            diagnosis_api_key: None,
            db_path: default_db_path(),
        }
    }
}

impl EngineConfig {
    /// Build a config from `INTAKE_*` environment variables, keeping defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] but reads through `lookup`, so callers
    /// (and tests) can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("INTAKE_DIAGNOSIS_URL").filter(|v| !v.trim().is_empty()) {
            config.diagnosis_url = Some(url.trim().to_string());
        }
        if let Some(key) = lookup("INTAKE_DIAGNOSIS_KEY").filter(|v| !v.trim().is_empty()) {
            config.diagnosis_api_key = Some(key.trim().to_string());
        }
        if let Some(raw) = lookup("INTAKE_ANALYSIS_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.analysis_timeout_secs = secs,
                _ => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid INTAKE_ANALYSIS_TIMEOUT_SECS, using default"
                ),
            }
        }
        if let Some(path) = lookup("INTAKE_DB_PATH").filter(|v| !v.trim().is_empty()) {
            config.db_path = PathBuf::from(path.trim());
        }

        config
    }

    pub fn analysis_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.analysis_timeout_secs)
    }
}
