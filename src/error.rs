//! Error types for the Pilum library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`PilumError`] enum.

use std::io;

use thiserror::Error;

/// The main error type for Pilum operations.
#[derive(Error, Debug)]
pub enum PilumError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Field/parser/container configuration errors
    #[error("config error: {0}")]
    Config(String),

    /// Malformed documents (conjunction count or size out of range)
    #[error("invalid document: {0}")]
    Validation(String),

    /// A value parser rejected its input
    #[error("field {field}: cannot parse value {value}: {cause}")]
    Parse {
        field: String,
        value: String,
        cause: String,
    },

    /// A holder rejected an expression or a commit
    #[error("indexing error: {0}")]
    Indexing(String),

    /// Cache payload encode/decode failures
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invariant violated (programmer error)
    #[error("internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`PilumError`].
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PilumError::Config(msg.into())
    }

    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        PilumError::Validation(msg.into())
    }

    /// Create a new parse error; the field context is attached later via
    /// [`PilumError::with_field`] by the holder that knows it.
    pub fn parse<V: Into<String>, C: Into<String>>(value: V, cause: C) -> Self {
        PilumError::Parse {
            field: String::new(),
            value: value.into(),
            cause: cause.into(),
        }
    }

    /// Create a new indexing error.
    pub fn indexing<S: Into<String>>(msg: S) -> Self {
        PilumError::Indexing(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        PilumError::Serialization(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PilumError::Internal(msg.into())
    }

    /// Attach a field name to a [`PilumError::Parse`] error; other variants
    /// pass through unchanged.
    pub fn with_field(self, field: &str) -> Self {
        match self {
            PilumError::Parse { value, cause, .. } => PilumError::Parse {
                field: field.to_string(),
                value,
                cause,
            },
            other => other,
        }
    }
}
