//! # Error Types
//!
//! Errors raised while planning and executing a side-load run. Every step of
//! the runner and the batch driver returns one of these instead of aborting
//! the process, so callers can decide which cleanup steps still run.

use crate::identifiers::IdValidationError;
use thiserror::Error;

/// Result type for side-load operations
pub type SideloadResult<T> = Result<T, SideloadError>;

/// Errors that can occur while orchestrating a backup, restore or merge
#[derive(Debug, Error)]
pub enum SideloadError {
    /// A database or namespace name failed validation
    #[error("Invalid identifier '{value}': {source}")]
    InvalidIdentifier {
        value: String,
        #[source]
        source: IdValidationError,
    },

    /// A timestamp could not be parsed or computed
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    /// A time window whose start is not strictly before its end
    #[error("Invalid time window: start {start} is not before end {end}")]
    InvalidWindow { start: String, end: String },

    /// The external program could not be started
    #[error("Failed to spawn '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran and exited unsuccessfully
    #[error("Command '{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A configuration value is missing or malformed
    #[error("Invalid configuration '{key}': {message}")]
    Config { key: String, message: String },

    /// One window of a batch failed; later windows were not attempted
    #[error("Window {index} [{start}, {end}) failed: {source}")]
    WindowFailed {
        index: usize,
        start: String,
        end: String,
        #[source]
        source: Box<SideloadError>,
    },
}

impl SideloadError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(value: impl Into<String>, source: IdValidationError) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
            source,
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from an external program rather than from input
    /// validation
    pub fn is_command_failure(&self) -> bool {
        match self {
            SideloadError::CommandSpawn { .. } | SideloadError::CommandFailed { .. } => true,
            SideloadError::WindowFailed { source, .. } => source.is_command_failure(),
            _ => false,
        }
    }
}
