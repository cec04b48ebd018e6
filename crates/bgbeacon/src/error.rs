//! Error types for the bgbeacon library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors raised by the byte transport connecting us to the radio module
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Timed out waiting for response: expected {expected} bytes, received {received}")]
    Timeout { expected: usize, received: usize },

    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected beacon configuration. Always raised before any byte is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid UUID length: expected 16 bytes, got {0}")]
    UuidLength(usize),

    #[error("Local name is {len} bytes, at most {max} fit in the scan response")]
    LocalNameTooLong { len: usize, max: usize },

    #[error("Local name must be ASCII")]
    LocalNameNotAscii,

    #[error("Invalid advertisement interval {0} ms, must be between 30 and 10230")]
    IntervalOutOfRange(u16),

    #[error("Advertising data is {0} bytes, at most 31 are allowed")]
    AdvDataTooLong(usize),

    #[error("Invalid duty cycle: {0}")]
    InvalidDutyCycle(String),
}

/// General error type for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid response to {command}: {reason}")]
    InvalidResponse {
        command: &'static str,
        reason: String,
    },
}

impl Error {
    /// True for a read that ran out of time (including partial responses)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Timeout { .. }))
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;
