//! Session verification.
//!
//! The verification state machine lives in the SDK. This module acquires the
//! controller, drives it one step at a time, and publishes the outcome of
//! each step as a [`VerificationState`].

use std::sync::Arc;

use roomsync_core::{SdkError, SessionError, SessionSdk, VerificationController};
use tokio::sync::watch;

use crate::SessionClient;

/// Observable lifecycle of a verification flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationState {
    /// No flow started.
    #[default]
    Initial,
    /// Verification was requested from another session.
    Requested,
    /// The session is verified.
    Verified,
    /// The flow was declined or cancelled.
    Cancelled,
    /// The last step failed.
    Failed,
}

impl VerificationState {
    /// Check if the flow has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Cancelled | Self::Failed)
    }
}

/// Acquire the verification controller and wrap it.
///
/// # Errors
///
/// - `SessionError::VerificationControllerUnavailable` if no controller could
///   be acquired.
pub async fn verify_session<S: SessionSdk>(
    client: &SessionClient<S>,
) -> Result<SessionVerification<S::Verification>, SessionError> {
    let controller = client.acquire_verification_controller().await?;
    Ok(SessionVerification::new(controller))
}

/// Handle to a running verification flow.
pub struct SessionVerification<C: VerificationController> {
    controller: Arc<C>,
    state: watch::Sender<VerificationState>,
}

impl<C: VerificationController> SessionVerification<C> {
    /// Wrap an acquired controller. Starts out `Verified` if the session
    /// already is.
    pub fn new(controller: C) -> Self {
        let initial = if controller.is_verified() {
            VerificationState::Verified
        } else {
            VerificationState::Initial
        };
        let (state, _) = watch::channel(initial);
        Self { controller: Arc::new(controller), state }
    }

    /// Current state.
    pub fn state(&self) -> VerificationState {
        *self.state.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<VerificationState> {
        self.state.subscribe()
    }

    /// Ask another session to verify this one.
    pub async fn request(&self) -> Result<VerificationState, SessionError> {
        self.step(VerificationState::Requested, C::request_verification).await
    }

    /// Confirm that the comparison matched.
    pub async fn approve(&self) -> Result<VerificationState, SessionError> {
        self.step(VerificationState::Verified, C::approve_verification).await
    }

    /// Report that the comparison did not match.
    pub async fn decline(&self) -> Result<VerificationState, SessionError> {
        self.step(VerificationState::Cancelled, C::decline_verification).await
    }

    /// Abort the flow.
    pub async fn cancel(&self) -> Result<VerificationState, SessionError> {
        self.step(VerificationState::Cancelled, C::cancel_verification).await
    }

    async fn step(
        &self,
        next: VerificationState,
        op: fn(&C) -> Result<(), SdkError>,
    ) -> Result<VerificationState, SessionError> {
        let controller = Arc::clone(&self.controller);
        let result = tokio::task::spawn_blocking(move || op(&controller))
            .await
            .map_err(|e| SessionError::TaskFailed { reason: e.to_string() })?;

        match result {
            Ok(()) => {
                self.state.send_replace(next);
                tracing::debug!(state = ?next, "verification step applied");
                Ok(next)
            },
            Err(e) => {
                self.state.send_replace(VerificationState::Failed);
                tracing::warn!(error = %e, "verification step failed");
                Err(SessionError::VerificationFailed { reason: e.to_string() })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    struct Controller {
        verified: bool,
        fail: AtomicBool,
    }

    impl Controller {
        fn check(&self) -> Result<(), SdkError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(SdkError::Other("rejected".into()))
            } else {
                Ok(())
            }
        }
    }

    impl VerificationController for Controller {
        fn is_verified(&self) -> bool {
            self.verified
        }

        fn request_verification(&self) -> Result<(), SdkError> {
            self.check()
        }

        fn approve_verification(&self) -> Result<(), SdkError> {
            self.check()
        }

        fn decline_verification(&self) -> Result<(), SdkError> {
            self.check()
        }

        fn cancel_verification(&self) -> Result<(), SdkError> {
            self.check()
        }
    }

    fn controller(verified: bool, fail: bool) -> Controller {
        Controller { verified, fail: AtomicBool::new(fail) }
    }

    #[test]
    fn already_verified_session_starts_verified() {
        let flow = SessionVerification::new(controller(true, false));
        assert_eq!(flow.state(), VerificationState::Verified);
        assert!(flow.state().is_terminal());
    }

    #[tokio::test]
    async fn request_then_approve_verifies() {
        let flow = SessionVerification::new(controller(false, false));
        assert_eq!(flow.state(), VerificationState::Initial);

        assert_eq!(flow.request().await, Ok(VerificationState::Requested));
        assert_eq!(flow.approve().await, Ok(VerificationState::Verified));
        assert_eq!(flow.state(), VerificationState::Verified);
    }

    #[tokio::test]
    async fn decline_cancels() {
        let flow = SessionVerification::new(controller(false, false));
        flow.request().await.unwrap();

        assert_eq!(flow.decline().await, Ok(VerificationState::Cancelled));
    }

    #[tokio::test]
    async fn failed_step_reports_and_publishes_failure() {
        let flow = SessionVerification::new(controller(false, true));
        let mut states = flow.subscribe();

        let result = flow.request().await;

        assert!(matches!(result, Err(SessionError::VerificationFailed { .. })));
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), VerificationState::Failed);
    }
}
