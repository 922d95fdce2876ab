//! Screen side-effects and intents.
//!
//! Actions are instructions produced by the screen state machines for the
//! runtime (navigation, rendering) or the [`crate::Bridge`] (session calls)
//! to execute.

use roomsync_core::{RoomId, UserProfile};

/// Actions produced by the [`crate::HomeScreen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    /// Render the screen.
    Render,

    /// Navigate to a room.
    OpenRoom {
        /// Room to open.
        room_id: RoomId,
    },

    /// Navigate to the settings screen.
    ShowSettings,

    /// Navigate to the start-chat screen.
    ShowStartChat,

    /// Start session verification.
    StartVerification,
}

/// Actions produced by the [`crate::StartChatScreen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartChatAction {
    /// Render the screen.
    Render,

    /// Run a user directory search.
    Search {
        /// Query text.
        query: String,
    },

    /// Look for an existing direct chat with a user.
    LookupDirectChat {
        /// Selected user.
        user: UserProfile,
    },

    /// Create (or reuse) the direct chat with a user.
    CreateDirectChat {
        /// User to chat with.
        user: UserProfile,
    },

    /// Navigate to a room.
    OpenRoom {
        /// Room to open.
        room_id: RoomId,
    },

    /// Navigate to room creation.
    CreateRoom,

    /// Dismiss the screen.
    Close,
}
