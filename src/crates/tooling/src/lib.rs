//! Tooling utilities shared across the intent-bridge workspace
//!
//! # Modules
//!
//! - `config` - Environment variable loading with typed parsing
//! - `async_utils` - Timeout wrapper for async operations
//! - `logging` - Duration formatting and secret redaction for log output

pub mod async_utils;
pub mod config;
pub mod logging;

use thiserror::Error;

/// Errors that can occur in the tooling crate
#[derive(Debug, Error)]
pub enum ToolingError {
    /// General error with message
    #[error("Tooling error: {0}")]
    General(String),
}

/// Result type for tooling operations
pub type Result<T> = std::result::Result<T, ToolingError>;
