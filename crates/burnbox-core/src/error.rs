use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage serialization failed: {0}")]
    Serialization(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by a [`PasteManager`](crate::manager::PasteManager).
///
/// `NotFound` covers "never existed", "expired" and "view limit
/// reached" so callers cannot tell them apart.
#[derive(Debug, Clone, Error)]
pub enum PasteError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("paste not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("could not allocate a free paste id after {0} attempts")]
    IdExhausted(usize),
}

impl PasteError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the offending field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PasteError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
