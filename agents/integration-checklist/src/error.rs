//! Error types for the Integration Checklist
//!
//! Every failure carries the full human-readable message, including the
//! `  * ... to resolve` fix line, so the CLI can surface it unchanged.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for checklist operations
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// The configuration file could not be located
    #[error("{0}")]
    ConfigMissing(String),

    /// The configuration file exists but breaks a validation rule
    #[error("{0}")]
    ConfigInvalid(String),

    /// The hosting API failed for a reason other than "file not found"
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),

    /// A required repository file is missing
    #[error("{0}")]
    FileMissing(String),

    /// A repository file exists but its contents are wrong
    #[error("{0}")]
    FileInvalid(String),

    /// Invalid arguments or settings
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable, machine-readable classification of a [`ChecklistError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigMissing,
    ConfigInvalid,
    UpstreamFetchFailed,
    FileMissing,
    FileInvalid,
    InvalidInput,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ConfigMissing => "config_missing",
            ErrorKind::ConfigInvalid => "config_invalid",
            ErrorKind::UpstreamFetchFailed => "upstream_fetch_failed",
            ErrorKind::FileMissing => "file_missing",
            ErrorKind::FileInvalid => "file_invalid",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", label)
    }
}

impl ChecklistError {
    /// Create a config-missing error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        ChecklistError::ConfigMissing(msg.into())
    }

    /// Create a config-invalid error
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        ChecklistError::ConfigInvalid(msg.into())
    }

    /// Create an upstream fetch error
    pub fn upstream(msg: impl Into<String>) -> Self {
        ChecklistError::UpstreamFetchFailed(msg.into())
    }

    /// Create a file-missing error
    pub fn file_missing(msg: impl Into<String>) -> Self {
        ChecklistError::FileMissing(msg.into())
    }

    /// Create a file-invalid error
    pub fn file_invalid(msg: impl Into<String>) -> Self {
        ChecklistError::FileInvalid(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ChecklistError::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ChecklistError::ConfigMissing(_) => ErrorKind::ConfigMissing,
            ChecklistError::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
            ChecklistError::UpstreamFetchFailed(_) => ErrorKind::UpstreamFetchFailed,
            ChecklistError::FileMissing(_) => ErrorKind::FileMissing,
            ChecklistError::FileInvalid(_) => ErrorKind::FileInvalid,
            ChecklistError::InvalidInput(_) => ErrorKind::InvalidInput,
            ChecklistError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is something the integration author can fix
    /// (as opposed to an infrastructure or internal problem)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ChecklistError::ConfigMissing(_)
                | ChecklistError::ConfigInvalid(_)
                | ChecklistError::FileMissing(_)
                | ChecklistError::FileInvalid(_)
                | ChecklistError::InvalidInput(_)
        )
    }
}

impl From<std::io::Error> for ChecklistError {
    fn from(err: std::io::Error) -> Self {
        ChecklistError::Internal(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for ChecklistError {
    fn from(err: serde_json::Error) -> Self {
        ChecklistError::Internal(format!("Serialization error: {}", err))
    }
}

impl From<toml::de::Error> for ChecklistError {
    fn from(err: toml::de::Error) -> Self {
        ChecklistError::InvalidInput(format!("TOML error: {}", err))
    }
}

impl From<reqwest::Error> for ChecklistError {
    fn from(err: reqwest::Error) -> Self {
        ChecklistError::UpstreamFetchFailed(err.to_string())
    }
}

/// Result type alias for checklist operations
pub type Result<T> = std::result::Result<T, ChecklistError>;
