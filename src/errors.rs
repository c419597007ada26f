//! Worldgate error types.

use thiserror::Error;

/// Errors surfaced by the gate's fallible seams.
///
/// None of these reach an end user directly: the edge gate only ever
/// produces a verdict, and the session store folds storage failures into
/// "no durable session".
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The session storage medium failed or is unavailable.
    #[error("Storage I/O error: {0}")]
    StorageIO(String),

    /// A persisted session record could not be understood.
    #[error("Session record corrupt: {0}")]
    SessionCorrupt(String),

    /// The overlay's event source went away before a correct password arrived.
    #[error("Password overlay closed before unlock")]
    OverlayClosed,
}
