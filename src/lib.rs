//! revoice - Batch audio translation pipeline
//!
//! Upload → transcribe → translate → synthesize, one file at a time, with
//! every intermediate artifact persisted to object storage.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod services;

// Core traits (the seams the orchestrator is driven through)
pub use services::speech::SpeechSynthesizer;
pub use services::storage::ObjectStore;
pub use services::transcribe::TranscriptionService;
pub use services::translate::TranslationService;

// Pipeline
pub use pipeline::orchestrator::{FilePipeline, PipelineOptions};
pub use pipeline::types::{BatchSummary, FileOutcome, FileReport, InputFile};

// Error handling
pub use error::{Result, RevoiceError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
