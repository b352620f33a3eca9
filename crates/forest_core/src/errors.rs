//! Error types for forest models

use thiserror::Error;

/// Errors raised while validating, hashing or persisting a forest
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(String),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
