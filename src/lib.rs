//! # Worldgate
//!
//! **Two-layer access gate for a web application.**
//!
//! - **Edge gate**: a stateless per-request decision that runs before any
//!   application code: optional HTTP Basic authentication on every
//!   non-exempt path, then bot and crawler filtering on `/api/` routes
//!   with an exception for social link-preview fetchers on the story
//!   endpoints.
//! - **Client gate**: a password overlay that holds application startup
//!   until the right password is entered, remembered for 30 days through a
//!   persisted session record.
//!
//! ## Quickstart
//!
//! ```
//! use worldgate::{EdgeGate, GateConfig, Verdict};
//!
//! let gate = EdgeGate::new(GateConfig::default().with_password("secret123")).unwrap();
//!
//! let verdict = gate.evaluate_parts("/api/data", None, Some("Mozilla/5.0 (X11; Linux)"));
//! assert!(matches!(verdict, Verdict::Deny(_)));
//! ```
//!
//! ## Configuration
//!
//! - `APP_PASSWORD`: edge shared secret; unset disables Basic auth
//! - `APP_USERNAME`: optional required username
//! - `APP_AUTH_REALM`: challenge realm, default `WorldMonitor`
//! - `VITE_APP_PASSWORD`: client overlay secret; unset disables the overlay
//!
//! See [`GateConfig`] for full documentation.
//!
//! ## Threat Model
//!
//! The credential check is a plain shared-secret comparison. There is no
//! rate limiting or lockout; both layers can be retried indefinitely.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Edge layer
pub mod edge;

// Client layer
pub mod session;
pub mod overlay;
pub mod bootstrap;

// Optional integrations
pub mod integrations;

// Re-exports for public API
pub use bootstrap::{ensure_password_gate, overlay_channel, Bootstrap, OverlayEvent, OverlayInput};
pub use clock::{Clock, SystemClock};
pub use config::GateConfig;
pub use edge::classify::{classify_user_agent, UaClassifier, UserAgentClass};
pub use edge::credentials::{parse_basic_credentials, Credentials};
pub use edge::gate::{Denial, EdgeGate, Verdict};
pub use edge::paths::PathRules;
pub use errors::GateError;
pub use overlay::{HeadlessSurface, OverlayState, OverlaySurface, PasswordOverlay, SubmitOutcome};
pub use session::backend::{FileBackend, MemoryBackend, StorageBackend};
pub use session::store::{SessionStatus, SessionStore, WriteOutcome, SESSION_TTL};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
