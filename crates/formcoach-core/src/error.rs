//! Core error types for formcoach-core.
//!
//! Most session operations never fail: illegal transitions are ignored and
//! collaborator failures are logged. These types cover the places where a
//! caller genuinely has to react (storage, configuration) plus the
//! collaborator errors that the sink and listener swallow.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for formcoach-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device channel errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Voice recognition errors
    #[error("Voice error: {0}")]
    Voice(#[from] VoiceError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored row could not be decoded
    #[error("Corrupt record '{id}': {message}")]
    CorruptRecord { id: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a device channel. Never fatal for a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No open connection to the device
    #[error("device channel is not connected")]
    NotConnected,

    /// The transport rejected the payload
    #[error("device send failed: {0}")]
    SendFailed(String),
}

/// Errors raised by a speech-recognition engine. Never fatal for a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// `start` called while the engine is still starting up
    #[error("recognizer is already starting")]
    AlreadyStarting,

    /// Any other start failure
    #[error("recognizer failed to start: {0}")]
    StartFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        let mapped: DatabaseError = err.into();
        assert!(matches!(mapped, DatabaseError::Locked));
    }

    #[test]
    fn device_error_wraps_into_core_error() {
        let err: CoreError = DeviceError::NotConnected.into();
        assert_eq!(err.to_string(), "Device error: device channel is not connected");
    }
}
