use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

use crate::accessor::AccessError;

// Every failure a Context can report. Absent values are not errors.
#[derive(Debug, Error)]
pub enum ContextError {
    // Model rejected at construction time (null, or a Context used as a model)
    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },

    // Child context requested without a parent to anchor it
    #[error("missing parent: a child context requires a parent context")]
    MissingParent,

    // Empty or malformed path expression
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    // An accessor failed while reading `segment` of `path`
    #[error("failed to read `{segment}` while resolving `{path}`: {source}")]
    PropertyAccess {
        path: String,
        segment: String,
        #[source]
        source: AccessError,
    },

    // Only produced when converting a `Serialize` value into a model
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContextError {
    pub(crate) fn invalid_model(reason: impl Into<String>) -> Self {
        ContextError::InvalidModel { reason: reason.into() }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        ContextError::InvalidPath { path: path.to_string(), reason: reason.into() }
    }
}

// Type alias for results that use `ContextError` as the error type
pub type Result<T> = std::result::Result<T, ContextError>;
