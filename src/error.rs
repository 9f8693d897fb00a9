//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Application-level errors.
///
/// Remote command failures are deliberately absent: a command that could not
/// run is reported as a [`crate::remote::CommandOutput`] with exit code -1.
#[derive(Error, Debug)]
pub enum AppError {
    // Embedding gateway
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    // Vector index
    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Vector index error: {message}")]
    Index { message: String },

    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Domain errors
    #[error("Knowledge entry not found: {0}")]
    KnowledgeNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Device errors
    #[error("Remote operation failed: {0}")]
    Remote(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Shorthand for an index-service error with a message.
    pub fn index(message: impl Into<String>) -> Self {
        AppError::Index {
            message: message.into(),
        }
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::Embedding(_) => (ErrorCode::INTERNAL_ERROR, "EMBEDDING_ERROR"),
            AppError::IndexUnavailable(_) => (ErrorCode::INTERNAL_ERROR, "INDEX_UNAVAILABLE"),
            AppError::Index { .. } => (ErrorCode::INTERNAL_ERROR, "INDEX_ERROR"),
            AppError::Serialization(_) => (ErrorCode::INTERNAL_ERROR, "SERIALIZATION_ERROR"),
            AppError::KnowledgeNotFound(_) => {
                (ErrorCode::RESOURCE_NOT_FOUND, "KNOWLEDGE_NOT_FOUND")
            }
            AppError::Validation(_) => (ErrorCode::INVALID_PARAMS, "VALIDATION_ERROR"),
            AppError::Remote(_) => (ErrorCode::INTERNAL_ERROR, "REMOTE_ERROR"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG_ERROR"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}
