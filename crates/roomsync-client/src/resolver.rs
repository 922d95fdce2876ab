//! Room id to summary resolution.

use roomsync_core::{MessageHandle, RoomId, RoomSummary, RoomView, SessionSdk};

use crate::{SessionClient, WeakSessionClient};

/// Build a fresh summary from a room handle.
///
/// The summary carries `id`, not the id the handle reports, so a summary is
/// always attributed to the slot it was resolved for. Messages without a
/// textual projection preview as the empty string.
pub fn summarize<R: RoomView>(id: RoomId, room: &R) -> RoomSummary {
    RoomSummary {
        id,
        display_name: room.name(),
        last_message_preview: room.latest_message().map(|m| m.body().unwrap_or_default()),
        is_direct: room.is_direct(),
        is_encrypted: room.is_encrypted(),
        unread_count: room.unread_count(),
    }
}

/// Turns room ids into [`RoomSummary`] records via the session's local
/// room state.
///
/// Keeps no summaries between calls: every [`RoomSummaryResolver::resolve`]
/// looks the room up again, so a failed lookup never leaves a stale summary
/// behind.
pub struct RoomSummaryResolver<S: SessionSdk> {
    session: WeakSessionClient<S>,
}

impl<S: SessionSdk> RoomSummaryResolver<S> {
    /// Create a resolver over `client`. The resolver does not keep the
    /// session alive.
    pub fn new(client: &SessionClient<S>) -> Self {
        Self { session: client.downgrade() }
    }

    /// Resolve `room_id` to a fresh summary. `None` if the room is not
    /// available in local sync state or the session is gone.
    pub fn resolve(&self, room_id: &RoomId) -> Option<RoomSummary> {
        let Some(client) = self.session.upgrade() else {
            tracing::debug!(%room_id, "session gone, not resolving room");
            return None;
        };

        match client.resolve_room(room_id) {
            Ok(room) => Some(summarize(room_id.clone(), &room)),
            Err(e) => {
                tracing::warn!(%room_id, error = %e, "dropping unresolvable room");
                None
            },
        }
    }
}
