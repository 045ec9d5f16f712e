//! Error types for revoice.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevoiceError {
    // Configuration errors
    #[error("Missing required configuration value: {key}")]
    ConfigMissingValue { key: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Storage errors
    #[error("Upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    // Transcription errors
    #[error("Failed to submit transcription job {job_name}: {message}")]
    TranscriptionSubmit { job_name: String, message: String },

    #[error("Transcription job {job_name} failed: {reason}")]
    TranscriptionJobFailed { job_name: String, reason: String },

    #[error("Failed to retrieve transcript: {message}")]
    TranscriptRetrieval { message: String },

    // Translation errors
    #[error("Translation failed: {message}")]
    Translation { message: String },

    // Speech synthesis errors
    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RevoiceError>;
