//! Password overlay state machine.
//!
//! The overlay blocks application startup until the client-gate password is
//! entered or a valid session already exists. Rendering is delegated to an
//! [`OverlaySurface`] so the state machine runs without a display.
//!
//! ```text
//! Idle ──activate──▶ AwaitingInput ──wrong submit──▶ Error(msg)
//!   │                    │   ▲                          │
//!   │                    │   └────────keystroke─────────┘
//!   │                    └──────right submit──────▶ Unlocked
//!   └──(disabled / valid session)───────────────────▶ Unlocked
//! ```

use crate::config::GateConfig;
use crate::session::store::{SessionStatus, SessionStore, WriteOutcome, SESSION_TTL};
use tracing::{debug, info};

/// Message shown after a wrong password.
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect password. Please try again.";

/// Text rendered by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayCopy {
    /// Dialog heading.
    pub title: &'static str,
    /// Explanation under the heading.
    pub description: &'static str,
    /// Label of the password field.
    pub input_label: &'static str,
    /// Submit button text.
    pub submit_label: &'static str,
}

impl Default for OverlayCopy {
    fn default() -> Self {
        Self {
            title: "Enter Password",
            description: "This site is protected. Enter the password to continue.",
            input_label: "Password",
            submit_label: "Unlock",
        }
    }
}

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    /// Not yet activated.
    Idle,
    /// Rendered and waiting for a submission.
    AwaitingInput,
    /// Last submission was wrong. Still accepts input.
    Error(String),
    /// Terminal. Startup may continue.
    Unlocked,
}

/// Result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Password accepted. Carries whether the session was persisted.
    Unlocked(WriteOutcome),
    /// Password rejected. The overlay stays up.
    Rejected,
    /// The overlay was not accepting input.
    Ignored,
}

/// Display side of the overlay.
pub trait OverlaySurface {
    /// Render the overlay over the page.
    fn mount(&mut self, copy: &OverlayCopy);
    /// Move focus to the password field.
    fn focus_input(&mut self);
    /// Empty the password field.
    fn clear_input(&mut self);
    /// Show an inline error.
    fn show_error(&mut self, message: &str);
    /// Hide the inline error.
    fn clear_error(&mut self);
    /// Remove the overlay from the page.
    fn unmount(&mut self);
}

/// Surface that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessSurface;

impl OverlaySurface for HeadlessSurface {
    fn mount(&mut self, _copy: &OverlayCopy) {}
    fn focus_input(&mut self) {}
    fn clear_input(&mut self) {}
    fn show_error(&mut self, _message: &str) {}
    fn clear_error(&mut self) {}
    fn unmount(&mut self) {}
}

/// The client-side password gate.
pub struct PasswordOverlay<S: OverlaySurface = HeadlessSurface> {
    expected_password: Option<String>,
    store: SessionStore,
    surface: S,
    copy: OverlayCopy,
    state: OverlayState,
}

impl<S: OverlaySurface> PasswordOverlay<S> {
    /// Create an idle overlay.
    ///
    /// The secret comes from `config.client_gate_password`; when it is
    /// unset, activation unlocks immediately.
    pub fn new(config: &GateConfig, store: SessionStore, surface: S) -> Self {
        Self {
            expected_password: config.client_gate_password.clone(),
            store,
            surface,
            copy: OverlayCopy::default(),
            state: OverlayState::Idle,
        }
    }

    /// Replace the rendered text.
    pub fn with_copy(mut self, copy: OverlayCopy) -> Self {
        self.copy = copy;
        self
    }

    /// Current state.
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Whether startup may continue.
    pub fn is_unlocked(&self) -> bool {
        self.state == OverlayState::Unlocked
    }

    /// The display surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Leave `Idle`.
    ///
    /// Skips straight to `Unlocked` without rendering when the gate is
    /// disabled or a valid session exists. Otherwise mounts the surface and
    /// waits for input. Has no effect outside `Idle`.
    pub fn activate(&mut self) -> &OverlayState {
        if self.state != OverlayState::Idle {
            return &self.state;
        }

        if self.expected_password.is_none() {
            debug!("client gate disabled");
            self.state = OverlayState::Unlocked;
            return &self.state;
        }

        if self.store.read() == SessionStatus::Valid {
            debug!("client gate session still valid");
            self.state = OverlayState::Unlocked;
            return &self.state;
        }

        self.surface.mount(&self.copy);
        self.surface.focus_input();
        self.state = OverlayState::AwaitingInput;
        &self.state
    }

    /// A keystroke in the password field. Clears a shown error.
    pub fn input(&mut self) {
        if let OverlayState::Error(_) = self.state {
            self.surface.clear_error();
            self.state = OverlayState::AwaitingInput;
        }
    }

    /// Submit a password attempt. Comparison is exact.
    pub fn submit(&mut self, value: &str) -> SubmitOutcome {
        if !matches!(
            self.state,
            OverlayState::AwaitingInput | OverlayState::Error(_)
        ) {
            return SubmitOutcome::Ignored;
        }

        let Some(expected) = self.expected_password.as_deref() else {
            return SubmitOutcome::Ignored;
        };

        if value == expected {
            let outcome = self.store.write(SESSION_TTL);
            self.surface.unmount();
            self.state = OverlayState::Unlocked;
            let persisted = outcome == WriteOutcome::Persisted;
            info!(persisted, "client gate unlocked");
            return SubmitOutcome::Unlocked(outcome);
        }

        debug!("client gate rejected password");
        self.surface.show_error(INCORRECT_PASSWORD_MESSAGE);
        self.surface.clear_input();
        self.surface.focus_input();
        self.state = OverlayState::Error(INCORRECT_PASSWORD_MESSAGE.to_string());
        SubmitOutcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::session::backend::{MemoryBackend, StorageBackend};
    use crate::session::store::SESSION_STORAGE_KEY;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl OverlaySurface for RecordingSurface {
        fn mount(&mut self, copy: &OverlayCopy) {
            self.calls.push(format!("mount:{}", copy.title));
        }
        fn focus_input(&mut self) {
            self.calls.push("focus".to_string());
        }
        fn clear_input(&mut self) {
            self.calls.push("clear_input".to_string());
        }
        fn show_error(&mut self, message: &str) {
            self.calls.push(format!("error:{}", message));
        }
        fn clear_error(&mut self) {
            self.calls.push("clear_error".to_string());
        }
        fn unmount(&mut self) {
            self.calls.push("unmount".to_string());
        }
    }

    fn overlay(
        password: Option<&str>,
    ) -> (Arc<MemoryBackend>, PasswordOverlay<RecordingSurface>) {
        let backend = Arc::new(MemoryBackend::new());
        let clock = Arc::new(MockClock::from_rfc3339("2025-01-15T12:00:00Z"));
        let store = SessionStore::new(backend.clone(), clock);
        let mut config = GateConfig::default();
        if let Some(password) = password {
            config = config.with_client_gate_password(password);
        }
        let overlay = PasswordOverlay::new(&config, store, RecordingSurface::default());
        (backend, overlay)
    }

    #[test]
    fn test_disabled_gate_unlocks_without_ui() {
        let (_, mut overlay) = overlay(None);
        assert_eq!(overlay.activate(), &OverlayState::Unlocked);
        assert!(overlay.surface().calls.is_empty());
    }

    #[test]
    fn test_valid_session_unlocks_without_ui() {
        let (backend, mut overlay) = overlay(Some("hunter2"));
        backend
            .set(SESSION_STORAGE_KEY, r#"{"expiresAt":99999999999999}"#)
            .unwrap();
        assert_eq!(overlay.activate(), &OverlayState::Unlocked);
        assert!(overlay.surface().calls.is_empty());
    }

    #[test]
    fn test_activation_mounts_and_focuses() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        assert_eq!(overlay.activate(), &OverlayState::AwaitingInput);
        assert_eq!(overlay.surface().calls, vec!["mount:Enter Password", "focus"]);
    }

    #[test]
    fn test_wrong_then_right_password() {
        let (backend, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();

        assert_eq!(overlay.submit("wrong"), SubmitOutcome::Rejected);
        assert_eq!(
            overlay.state(),
            &OverlayState::Error(INCORRECT_PASSWORD_MESSAGE.to_string())
        );
        assert!(!overlay.is_unlocked());

        assert_eq!(
            overlay.submit("hunter2"),
            SubmitOutcome::Unlocked(WriteOutcome::Persisted)
        );
        assert!(overlay.is_unlocked());
        assert!(backend.get(SESSION_STORAGE_KEY).unwrap().is_some());

        let errors = overlay
            .surface()
            .calls
            .iter()
            .filter(|c| c.starts_with("error:"))
            .count();
        assert_eq!(errors, 1);
        assert_eq!(overlay.surface().calls.last().map(String::as_str), Some("unmount"));
    }

    #[test]
    fn test_keystroke_clears_error() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();
        overlay.submit("nope");
        overlay.input();
        assert_eq!(overlay.state(), &OverlayState::AwaitingInput);
        assert_eq!(overlay.surface().calls.last().map(String::as_str), Some("clear_error"));

        // A keystroke without an error is a no-op.
        let before = overlay.surface().calls.len();
        overlay.input();
        assert_eq!(overlay.surface().calls.len(), before);
    }

    #[test]
    fn test_rejection_clears_and_refocuses() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();
        overlay.submit("nope");
        let calls = &overlay.surface().calls;
        assert_eq!(
            &calls[calls.len() - 3..],
            &[
                format!("error:{}", INCORRECT_PASSWORD_MESSAGE),
                "clear_input".to_string(),
                "focus".to_string()
            ]
        );
    }

    #[test]
    fn test_comparison_is_exact() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();
        assert_eq!(overlay.submit(" hunter2"), SubmitOutcome::Rejected);
        assert_eq!(overlay.submit("HUNTER2"), SubmitOutcome::Rejected);
        assert_eq!(overlay.submit(""), SubmitOutcome::Rejected);
    }

    #[test]
    fn test_unlimited_retries() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();
        for _ in 0..50 {
            assert_eq!(overlay.submit("guess"), SubmitOutcome::Rejected);
        }
        assert!(matches!(overlay.submit("hunter2"), SubmitOutcome::Unlocked(_)));
    }

    #[test]
    fn test_submit_ignored_outside_input_states() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        assert_eq!(overlay.submit("hunter2"), SubmitOutcome::Ignored);
        assert_eq!(overlay.state(), &OverlayState::Idle);

        overlay.activate();
        overlay.submit("hunter2");
        assert_eq!(overlay.submit("hunter2"), SubmitOutcome::Ignored);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let (_, mut overlay) = overlay(Some("hunter2"));
        overlay.activate();
        overlay.activate();
        assert_eq!(overlay.surface().calls, vec!["mount:Enter Password", "focus"]);
    }
}
