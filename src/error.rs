// SPDX-License-Identifier: MIT

//! Application error types shared across the sync core.

/// Error type for the codec, store, repository, and bridge layers.
///
/// Nothing here is fatal: every variant is reported to the caller for
/// display or logging. Sequential operations surface the first error in
/// the chain; batch operations aggregate per-item errors and continue.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A required record field was missing or had the wrong shape.
    /// Decoding stops at the first failing field, in declared order.
    #[error("Missing or malformed field: {field}")]
    Decode { field: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Remote store failure (network or backend), message passed through.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Media classification failure: malformed URL, bad response, or
    /// unrecognized media type.
    #[error("Media classification error: {0}")]
    Classification(String),

    #[error("External source error: {0}")]
    ExternalSource(String),

    /// A multi-step operation failed partway through. Earlier steps are
    /// not rolled back; `created_id` carries the id of the record that
    /// was already written so the caller can act on the partial state.
    #[error("{message}")]
    Consistency {
        message: String,
        created_id: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SyncError {
    /// Classifier verdict when content matches no recognized media type.
    pub const INVALID_MEDIA_TYPE: &'static str = "Invalid media type";

    /// Error reported by `get_many` when given an empty id list.
    pub const NO_IDENTIFIERS: &'static str = "No identifiers passed!";

    /// Convenience constructor for a decode failure on `field`.
    pub fn missing(field: &str) -> Self {
        SyncError::Decode {
            field: field.to_string(),
        }
    }

    /// The failing field name, if this is a decode error.
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            SyncError::Decode { field } => Some(field),
            _ => None,
        }
    }

    /// The id of the record a partial multi-step operation already
    /// created, if any.
    pub fn partial_created_id(&self) -> Option<&str> {
        match self {
            SyncError::Consistency { created_id, .. } => created_id.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;
