//! Error types for parrotweb-core
//!
//! Validation failures are not errors here: they are reported per field
//! through [`crate::validation::Verdict`]. `CoreError` covers misuse of the
//! form controller and failures of the durable session store.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Field name not present in the form
    UnknownField,
    /// Transaction id not present in the loaded collection
    TransactionNotFound,
    /// Session store could not be read or written
    SessionStore,
    /// No bearer token available
    NotAuthenticated,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UnknownField => write!(f, "UNKNOWN_FIELD"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::SessionStore => write!(f, "SESSION_STORE"),
            ErrorCode::NotAuthenticated => write!(f, "NOT_AUTHENTICATED"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for parrotweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown form field: {name}")]
    UnknownField { name: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: u64 },

    #[error("Session store error: {message}")]
    SessionStore { message: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UnknownField { .. } => ErrorCode::UnknownField,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::SessionStore { .. } => ErrorCode::SessionStore,
            CoreError::NotAuthenticated => ErrorCode::NotAuthenticated,
            CoreError::Io(_) => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::UnknownField { .. } => ErrorSeverity::Error,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::SessionStore { .. } => ErrorSeverity::Error,
            CoreError::NotAuthenticated => ErrorSeverity::Warning,
            CoreError::Io(_) => ErrorSeverity::Error,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::SessionStore {
            message: error.to_string(),
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
