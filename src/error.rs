//! Error handling for chromium-login-import

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::host::HostError;

/// Remediation hint attached to every data-access failure.
pub const CLOSE_BROWSER_HINT: &str =
    "It may help to close all running instances of the browser.";

/// Main error type for import operations
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Profile not found: {}", .0.display())]
    ProfileNotFound(PathBuf),

    #[error("{message}")]
    DataAccess {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid type in column '{column}': expected {expected}, found {found}")]
    InvalidColumnType {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Decrypted password is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Chromium timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("Failed to decrypt password: {0}")]
    Decrypt(String),

    #[error("Failed to create entry: {0}")]
    EntryCreation(#[source] HostError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure category, for callers that only care about the class of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProfileNotFound,
    DataAccess,
    InvalidData,
    Decrypt,
    Host,
    Environment,
}

impl ImportError {
    /// Wrap a failure raised by the login store.
    pub fn data_access(source: rusqlite::Error) -> Self {
        let message = format!(
            "Error while using the browser's login database. {}\n\n{}",
            CLOSE_BROWSER_HINT, source
        );
        ImportError::DataAccess { message, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::ProfileNotFound(_) => ErrorKind::ProfileNotFound,
            ImportError::DataAccess { .. } => ErrorKind::DataAccess,
            ImportError::InvalidColumnType { .. }
            | ImportError::InvalidUtf8(_)
            | ImportError::InvalidTimestamp(_) => ErrorKind::InvalidData,
            ImportError::Decrypt(_) => ErrorKind::Decrypt,
            ImportError::EntryCreation(_) => ErrorKind::Host,
            ImportError::Config(_) | ImportError::Unsupported(_) | ImportError::Io(_) => {
                ErrorKind::Environment
            }
        }
    }
}

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;
