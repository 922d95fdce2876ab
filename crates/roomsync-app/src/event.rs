//! Screen input events.
//!
//! Events are what the [`crate::Bridge`] and [`crate::Runtime`] learned from
//! the session client, reshaped into plain data for the screen state
//! machines.

use roomsync_client::{UsersSection, VerificationState};
use roomsync_core::{RoomId, RoomSummary, UserProfile};

/// Events processed by the [`crate::HomeScreen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEvent {
    /// The coordinator published a new room list.
    RoomsUpdated(Vec<RoomSummary>),

    /// Own display name loaded.
    DisplayNameLoaded(String),

    /// Own display name could not be loaded.
    DisplayNameUnavailable,

    /// Own avatar URL loaded.
    AvatarLoaded(String),

    /// Own avatar URL could not be loaded.
    AvatarUnavailable,

    /// Verification state observed.
    VerificationChanged(VerificationState),

    /// Room filter text changed.
    SearchQueryChanged(String),

    /// Error to surface to the user.
    Error {
        /// User-facing description.
        message: String,
    },
}

/// Events processed by the [`crate::StartChatScreen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartChatEvent {
    /// Users section replaced.
    SectionUpdated(UsersSection),

    /// A direct chat with the selected user already exists.
    ExistingDirectChat(RoomId),

    /// No direct chat exists; the user must confirm the invite.
    InviteNeeded(UserProfile),

    /// A direct chat was created.
    DirectChatCreated(RoomId),

    /// Starting the chat failed.
    StartChatFailed,

    /// Search failed; the section is unchanged.
    SearchFailed,
}
