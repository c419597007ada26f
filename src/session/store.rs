//! Persisted password-gate session.
//!
//! A single record `{"expiresAt": <epoch millis>}` lives under one storage
//! key. Reading validates and purges eagerly; writing always replaces the
//! whole record and never fails the caller.

use crate::clock::Clock;
use crate::session::backend::StorageBackend;
use crate::GateError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Storage key holding the session record.
pub const SESSION_STORAGE_KEY: &str = "worldmonitor-password-gate";

/// Lifetime of a session created by a successful unlock (30 days).
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// The persisted session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_at: i64,
}

/// Result of reading the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A well-formed, unexpired session exists.
    Valid,
    /// No usable session; any stored value has been purged.
    Absent,
}

/// Result of writing the session.
///
/// Callers proceed either way; `Degraded` only means the unlock will not
/// survive a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was stored.
    Persisted,
    /// The storage medium refused the write.
    Degraded,
}

/// Reads and writes the one session record.
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    key: String,
}

impl SessionStore {
    /// Create a store over `backend` using the standard key.
    pub fn new(backend: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            key: SESSION_STORAGE_KEY.to_string(),
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load and validate the session.
    ///
    /// Missing → `Absent`. Malformed, expired or unreadable → the stored
    /// value is deleted and `Absent` is returned.
    pub fn read(&self) -> SessionStatus {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionStatus::Absent,
            Err(e) => {
                warn!(error = %e, "session storage unreadable");
                self.purge();
                return SessionStatus::Absent;
            }
        };

        let expires_at = match parse_expiry(&raw) {
            Ok(expires_at) => expires_at,
            Err(e) => {
                debug!(error = %e, "discarding malformed session");
                self.purge();
                return SessionStatus::Absent;
            }
        };

        if expires_at <= self.clock.now_millis() as f64 {
            debug!(expires_at, "discarding expired session");
            self.purge();
            return SessionStatus::Absent;
        }

        SessionStatus::Valid
    }

    /// Persist a session expiring `ttl` from now, replacing any prior value.
    pub fn write(&self, ttl: Duration) -> WriteOutcome {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let record = SessionRecord {
            expires_at: self.clock.now_millis().saturating_add(ttl_millis),
        };

        match self.try_write(&record) {
            Ok(()) => {
                debug!(expires_at = record.expires_at, "session persisted");
                WriteOutcome::Persisted
            }
            Err(e) => {
                warn!(error = %e, "session not persisted; unlock lasts for this load only");
                WriteOutcome::Degraded
            }
        }
    }

    fn try_write(&self, record: &SessionRecord) -> Result<(), GateError> {
        let json = serde_json::to_string(record)
            .map_err(|e| GateError::SessionCorrupt(format!("Failed to serialize session: {}", e)))?;
        self.backend.set(&self.key, &json)
    }

    fn purge(&self) {
        if let Err(e) = self.backend.remove(&self.key) {
            warn!(error = %e, "failed to purge session record");
        }
    }
}

/// Extract `expiresAt` from a stored value.
///
/// Any JSON number is accepted. Anything else is corrupt.
fn parse_expiry(raw: &str) -> Result<f64, GateError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| GateError::SessionCorrupt(format!("Invalid JSON: {}", e)))?;

    value
        .as_object()
        .and_then(|object| object.get("expiresAt"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| GateError::SessionCorrupt("expiresAt missing or not a number".to_string()))
}
