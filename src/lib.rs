pub mod config;
pub mod models;
pub mod extraction; // Utterance -> structured fields
pub mod diagnosis; // Diagnosis service + document store
pub mod dialogue; // Stage machine + chat session

pub use dialogue::{ChatSession, DialogueError};
pub use extraction::{extract, ExtractionResult};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
