//! Error types for pupil-client.

use thiserror::Error;

/// Main error type for all capture and decode operations.
#[derive(Debug, Error)]
pub enum PupilError {
    /// Socket error from the underlying ZeroMQ transport.
    #[error("socket error: {0}")]
    Socket(#[from] zeromq::ZmqError),

    /// Configuration error during the control handshake (malformed or
    /// missing reply). Fatal before any subscription is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Protocol error during record decoding (marker mismatch, literal
    /// mismatch, or an unrecognized key inside a known structure).
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using PupilError.
pub type Result<T> = std::result::Result<T, PupilError>;
