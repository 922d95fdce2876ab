//! Error types for the session core.
//!
//! Strongly-typed errors per layer: [`SdkError`] is the opaque failure
//! reported by the external SDK, [`SessionError`] is what callers of the
//! session facade see, and [`InitError`] covers the fatal case where no
//! session can be constructed at all.
//!
//! SDK failures are never surfaced verbatim: every facade operation maps them
//! onto exactly one [`SessionError`] variant so that callers can match on
//! what failed rather than on how the SDK describes it.

use thiserror::Error;

use crate::RoomId;

/// Opaque failure reported by the external protocol SDK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The requested entity does not exist.
    #[error("not found")]
    NotFound,

    /// Transport-level failure talking to the homeserver.
    #[error("network failure: {0}")]
    Network(String),

    /// Any other SDK failure.
    #[error("sdk failure: {0}")]
    Other(String),
}

/// Errors surfaced by session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Room id absent from the current feed snapshot or remote lookup.
    #[error("room not found: {room_id}")]
    RoomNotFound {
        /// Room that was looked up.
        room_id: RoomId,
    },

    /// Own display name could not be loaded.
    #[error("display name unavailable: {reason}")]
    DisplayNameUnavailable {
        /// Underlying failure.
        reason: String,
    },

    /// Own avatar URL could not be loaded.
    #[error("avatar unavailable: {reason}")]
    AvatarUnavailable {
        /// Underlying failure.
        reason: String,
    },

    /// Media content could not be fetched.
    #[error("media fetch failed: {reason}")]
    MediaFetchFailed {
        /// Underlying failure.
        reason: String,
    },

    /// No session verification controller could be acquired.
    #[error("session verification controller unavailable: {reason}")]
    VerificationControllerUnavailable {
        /// Underlying failure.
        reason: String,
    },

    /// A verification step on an acquired controller failed.
    #[error("session verification failed: {reason}")]
    VerificationFailed {
        /// Underlying failure.
        reason: String,
    },

    /// Direct room lookup or creation failed. The cause is only logged.
    #[error("could not start chat")]
    DirectRoomOperationFailed,

    /// User directory search failed.
    #[error("profile search failed: {reason}")]
    ProfileSearchFailed {
        /// Underlying failure.
        reason: String,
    },

    /// Background task running the operation panicked or was cancelled.
    #[error("background task failed: {reason}")]
    TaskFailed {
        /// Join error description.
        reason: String,
    },

    /// The session has been shut down.
    #[error("session has been shut down")]
    SessionClosed,
}

impl SessionError {
    /// Short message suitable for a user-facing alert.
    ///
    /// Callers that need the cause match on the variant instead.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RoomNotFound { .. } => "This room is no longer available",
            Self::DisplayNameUnavailable { .. } | Self::AvatarUnavailable { .. } => {
                "Could not load your profile"
            },
            Self::MediaFetchFailed { .. } => "Could not load media",
            Self::VerificationControllerUnavailable { .. } | Self::VerificationFailed { .. } => {
                "Session verification is unavailable"
            },
            Self::DirectRoomOperationFailed => "Could not start chat",
            Self::ProfileSearchFailed { .. } => "Could not search for users",
            Self::TaskFailed { .. } | Self::SessionClosed => "Something went wrong",
        }
    }
}

/// Fatal failures while constructing a session.
///
/// No partial session is ever exposed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Configuration was rejected before contacting the SDK.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The authenticated user id could not be read.
    #[error("user id unavailable: {0}")]
    UserIdUnavailable(SdkError),

    /// The room-list feed could not be opened.
    #[error("room-list feed unavailable: {0}")]
    FeedUnavailable(SdkError),

    /// Background synchronization could not be started.
    #[error("sync failed to start: {0}")]
    SyncStartFailed(SdkError),
}

/// Invalid session or feed configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Feed name is empty.
    #[error("feed name must not be empty")]
    EmptyFeedName,

    /// No sort key was given.
    #[error("at least one sort key is required")]
    NoSortKeys,

    /// Batch size is zero.
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    /// Minimum search query length is zero.
    #[error("minimum search query length must be greater than zero")]
    ZeroSearchQueryLen,
}

/// Invalid identifier.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// Identifier is the empty string.
    #[error("identifier must not be empty")]
    Empty,
}
