//! Conversational intake: the stage machine, reply texts, urgency rules and
//! the session that ties them to the diagnosis and document collaborators.

pub mod responses;
pub mod session;
pub mod transitions;
pub mod urgency;

pub use responses::{FixedPicker, PhrasePicker, RandomPicker};
pub use session::ChatSession;
pub use transitions::TurnOutcome;

use thiserror::Error;

use crate::diagnosis::DiagnosisError;
use crate::extraction::ExtractionError;

#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Diagnosis error: {0}")]
    Diagnosis(#[from] DiagnosisError),

    #[error("Turn processing failed: {0}")]
    TurnFailed(String),

    #[error("An analysis is already in progress")]
    SessionBusy,

    #[error("Session has been closed")]
    SessionClosed,
}
