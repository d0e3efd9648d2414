//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`ServeError`] as the error type.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ServeError {
    // Model loading
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model format: {0}")]
    ModelFormat(String),

    // Tokenization
    #[error("Tokenizer not found: {0}")]
    TokenizerNotFound(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    // Inference
    #[error("Predicted class {id} not in id2label. Available: {available}")]
    UnknownLabel { id: u32, available: String },

    #[error("Model is not initialized")]
    NotInitialized,

    // Requests
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Network/Download
    #[error("Download failed: {0}")]
    Download(String),

    // Device
    #[error("Device error: {0}")]
    Device(String),

    // Process
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Background task failed: {0}")]
    Task(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServeError>;

impl ServeError {
    /// Whether a failed startup attempt is worth repeating.
    ///
    /// Network trouble and transient I/O can clear up on their own; missing or
    /// malformed model assets never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServeError::Download(_) => true,
            ServeError::Bind { source, .. } => is_transient_io(source),
            ServeError::Io(e) => is_transient_io(e),
            _ => false,
        }
    }
}

fn is_transient_io(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        e.kind(),
        ErrorKind::AddrInUse
            | ErrorKind::AddrNotAvailable
            | ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::Interrupted
            | ErrorKind::TimedOut
            | ErrorKind::WouldBlock
    )
}

impl From<tokio::task::JoinError> for ServeError {
    fn from(value: tokio::task::JoinError) -> Self {
        ServeError::Task(value.to_string())
    }
}

impl From<hf_hub::api::sync::ApiError> for ServeError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        ServeError::Download(format!("HuggingFace API error: {value}"))
    }
}
