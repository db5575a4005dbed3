//! Global error handling for treedump
//!
//! Errors in this module are fatal: they abort the run. Failures scoped to a
//! single file are modelled by [`crate::reader::ReadError`] and never surface
//! here.

use std::io;
use thiserror::Error;

/// Global error type for treedump operations
#[derive(Error, Debug)]
pub enum DumpError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The finished output could not be moved into place
    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// JSON report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for treedump operations
pub type Result<T> = std::result::Result<T, DumpError>;

/// Creates a DumpError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::DumpError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

impl From<DumpError> for io::Error {
    fn from(err: DumpError) -> Self {
        match err {
            DumpError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
