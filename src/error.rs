//! Error types for feedbackhub.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for feedback operations.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more submitted fields failed validation. User-correctable.
    #[error("invalid feedback: {0}")]
    Validation(ValidationErrors),

    /// The backing file could not be read, parsed or written.
    #[error("feedback storage unavailable at {path}: {source}")]
    StorageUnavailable {
        /// Path to the data file.
        path: PathBuf,
        /// What went wrong underneath.
        #[source]
        source: StorageFault,
    },

    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// An internal error occurred (bug or runtime failure).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Underlying cause of a storage failure.
#[derive(Error, Debug)]
pub enum StorageFault {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for feedbackhub operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Wrap a storage fault with the path it happened on.
    #[must_use]
    pub fn storage(path: impl Into<PathBuf>, source: impl Into<StorageFault>) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the caller can fix this by changing their input.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
