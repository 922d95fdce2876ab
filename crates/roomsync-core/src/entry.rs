//! Room-list entries as delivered by the sync feed.

use serde::{Deserialize, Serialize};

use crate::RoomId;

/// One slot in the feed's remote-ordered room list.
///
/// The feed owns these; the core only ever reads a snapshot of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomListEntry {
    /// Slot exists but has not been filled by the server yet.
    Empty,
    /// Slot holds a room whose content is current.
    Filled(RoomId),
    /// Slot held this room but its content is stale and must be re-fetched.
    Invalidated(RoomId),
}

impl RoomListEntry {
    /// Room id held by this slot. `None` for [`RoomListEntry::Empty`].
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Empty => None,
            Self::Filled(id) | Self::Invalidated(id) => Some(id),
        }
    }

    /// Check if this slot is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
