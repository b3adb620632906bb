//! Error types for epmd-client
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using EpmdError
pub type Result<T> = std::result::Result<T, EpmdError>;

/// Unified error type for epmd-client operations
#[derive(Debug, Error)]
pub enum EpmdError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    /// The daemon's payload was malformed, reported a failure result code,
    /// or advertised an incompatible protocol version range.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A well-formed response of the wrong kind for the request in flight.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// A request was issued in a connection state that forbids it, e.g. a
    /// second send on a socket whose single exchange is already spent.
    #[error("Session error: {0}")]
    Session(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
