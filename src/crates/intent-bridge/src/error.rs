//! Error taxonomy for the intent pipeline
//!
//! Every stage returns these internally. The public entry points turn them
//! into degraded outputs (a rule-based parse, a mock payload, a default
//! envelope) instead of handing them to the caller.

use thiserror::Error;

/// Errors raised inside the pipeline
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Language-model delegate could not produce an intent
    #[error("Intent parse failed: {0}")]
    ParseFailure(String),

    /// No service/endpoint for the parsed intent
    #[error("API not found: {0}")]
    LookupMiss(String),

    /// Request could not be built or the live call failed
    #[error("Execution failed: {0}")]
    ExecutionFailure(String),

    /// A per-service converter rejected the payload shape
    #[error("Normalization failed: {0}")]
    NormalizationFailure(String),

    /// Learning store could not be read or written
    #[error("Persistence failed: {0}")]
    PersistenceFailure(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error(transparent)]
    Http(#[from] utils::UtilsError),

    /// Language-model provider error
    #[error(transparent)]
    Llm(#[from] llm::LlmError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<tooling::ToolingError> for BridgeError {
    fn from(err: tooling::ToolingError) -> Self {
        BridgeError::Config(err.to_string())
    }
}
