//! Core error types for the regression engine.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for dump, restore and comparison operations.
///
/// Differences found while comparing results are data, not errors. Only the
/// final regression assertion turns them into [`Error::RegressionFailed`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport operation failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Master operation failed: {0}")]
    Master(#[from] MasterError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("View execution failed: {0}")]
    ViewExecution(String),

    #[error("Regression check failed:\n{0}")]
    RegressionFailed(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by codecs and containers.
///
/// `NotADirectory` and `MissingFile` are usage errors and are reported before
/// any data is touched. Every other variant aborts the current dump or restore
/// pass.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(String),

    #[error("Required file is missing: {0}")]
    MissingFile(String),

    #[error("Failed to encode object: {0}")]
    Encode(String),

    #[error("Failed to decode object: {0}")]
    Decode(String),

    #[error("Archive failure: {0}")]
    Archive(String),

    #[error("No {0} session is open")]
    SessionNotOpen(&'static str),

    #[error("A {0} session is already open")]
    SessionAlreadyOpen(&'static str),
}

/// Errors raised by master implementations.
#[derive(Error, Debug)]
pub enum MasterError {
    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A restore destination already holds records.
    #[error("Destination master is not empty: {0}")]
    NotEmpty(String),

    /// The record cannot be stored in its current shape.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Storage backend failure, stringified by the storage layer.
    #[error("Storage failure: {0}")]
    Storage(String),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(err))
    }
}

impl From<zip::result::ZipError> for TransportError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => TransportError::Io(io),
            other => TransportError::Archive(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Transport(err.into())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
