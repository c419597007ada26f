//! Startup ordering around the password overlay.
//!
//! Application initialization is handed to [`Bootstrap::run`] as a closure
//! and only starts once the overlay reports `Unlocked`. Anything that does
//! not touch gated content, such as error tracking, belongs before `run`.

use crate::overlay::{OverlayState, OverlaySurface, PasswordOverlay, SubmitOutcome};
use crate::GateError;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// User interaction delivered to the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    /// A keystroke in the password field.
    Input,
    /// The form was submitted with this value.
    Submit(String),
}

/// Sending half of the overlay's event channel, held by the UI.
#[derive(Debug, Clone)]
pub struct OverlayInput {
    tx: mpsc::Sender<OverlayEvent>,
}

impl OverlayInput {
    /// Report a keystroke.
    pub async fn keystroke(&self) -> Result<(), GateError> {
        self.send(OverlayEvent::Input).await
    }

    /// Submit a password attempt.
    pub async fn submit(&self, value: impl Into<String>) -> Result<(), GateError> {
        self.send(OverlayEvent::Submit(value.into())).await
    }

    async fn send(&self, event: OverlayEvent) -> Result<(), GateError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| GateError::OverlayClosed)
    }
}

/// Create the channel between UI events and the overlay.
pub fn overlay_channel(buffer: usize) -> (OverlayInput, mpsc::Receiver<OverlayEvent>) {
    let (tx, rx) = mpsc::channel(buffer);
    (OverlayInput { tx }, rx)
}

/// Activate the overlay and wait until it unlocks.
///
/// Returns immediately when the gate is disabled or a session is valid.
///
/// # Errors
/// `OverlayClosed` if the event channel closes first. There is no other
/// way out.
pub async fn ensure_password_gate<S: OverlaySurface>(
    overlay: &mut PasswordOverlay<S>,
    events: &mut mpsc::Receiver<OverlayEvent>,
) -> Result<(), GateError> {
    if *overlay.activate() == OverlayState::Unlocked {
        return Ok(());
    }

    debug!("waiting for password");
    while let Some(event) = events.recv().await {
        match event {
            OverlayEvent::Input => overlay.input(),
            OverlayEvent::Submit(value) => {
                if let SubmitOutcome::Unlocked(_) = overlay.submit(&value) {
                    return Ok(());
                }
            }
        }
    }

    Err(GateError::OverlayClosed)
}

/// Runs the password gate, then the application.
pub struct Bootstrap<S: OverlaySurface> {
    overlay: PasswordOverlay<S>,
}

impl<S: OverlaySurface> Bootstrap<S> {
    /// Wrap an idle overlay.
    pub fn new(overlay: PasswordOverlay<S>) -> Self {
        Self { overlay }
    }

    /// Resolve the gate, then await `init`.
    ///
    /// `init` is not called at all if the gate never unlocks.
    pub async fn run<F, Fut, T>(
        mut self,
        mut events: mpsc::Receiver<OverlayEvent>,
        init: F,
    ) -> Result<T, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        ensure_password_gate(&mut self.overlay, &mut events).await?;
        info!("password gate resolved; starting application");
        Ok(init().await)
    }
}
