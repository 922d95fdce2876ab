//! Demo error types.

use std::time::Duration;

use roomsync_core::InitError;
use thiserror::Error;

/// Errors that end a demo run.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The session could not be started.
    #[error("session start failed: {0}")]
    Init(#[from] InitError),

    /// The coordinator did not catch up with the feed in time.
    #[error("coordinator stalled at {processed} of {expected} notifications after {waited:?}")]
    Stalled {
        /// Notifications processed.
        processed: u64,
        /// Notifications sent.
        expected: u64,
        /// Time waited.
        waited: Duration,
    },

    /// The published room list broke an invariant.
    #[error("invariant violated after step {step}: {details}")]
    InvariantViolated {
        /// Mutation step after which the check failed.
        step: usize,
        /// Every violation, one per line.
        details: String,
    },

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
