//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the feed, the set of rooms the SDK can resolve, and the
//! published room list at one point in time, so every invariant sees the
//! same consistent state.

use std::collections::BTreeSet;

use roomsync_client::SyncState;
use roomsync_core::{RoomId, RoomListEntry, RoomSummary};
use serde::Serialize;

use crate::SimSdk;

/// Snapshot of the feed and the published room list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    /// Feed entries in feed order.
    pub feed: Vec<RoomListEntry>,
    /// Rooms in the feed that currently resolve.
    pub resolvable: BTreeSet<RoomId>,
    /// Published summaries in published order.
    pub published: Vec<RoomSummary>,
    /// Published notification counter.
    pub notifications: u64,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the simulated feed and a published state.
    pub fn capture(sdk: &SimSdk, state: &SyncState) -> Self {
        let feed = sdk.entries();
        let resolvable = feed
            .iter()
            .filter_map(RoomListEntry::room_id)
            .filter(|id| sdk.is_resolvable(id))
            .cloned()
            .collect();

        Self { feed, resolvable, published: state.rooms.clone(), notifications: state.notifications }
    }

    /// Set the feed entries.
    #[must_use]
    pub fn with_feed(mut self, feed: Vec<RoomListEntry>) -> Self {
        self.feed = feed;
        self
    }

    /// Mark rooms as resolvable.
    #[must_use]
    pub fn with_resolvable(mut self, ids: impl IntoIterator<Item = RoomId>) -> Self {
        self.resolvable.extend(ids);
        self
    }

    /// Set the published summaries.
    #[must_use]
    pub fn with_published(mut self, published: Vec<RoomSummary>) -> Self {
        self.published = published;
        self
    }

    /// Ids the coordinator is expected to publish, in order.
    pub fn expected_ids(&self) -> Vec<&RoomId> {
        self.feed
            .iter()
            .filter_map(RoomListEntry::room_id)
            .filter(|id| self.resolvable.contains(*id))
            .collect()
    }

    /// Published ids, in order.
    pub fn published_ids(&self) -> Vec<&RoomId> {
        self.published.iter().map(|room| &room.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SimRoom, sim_room_id};

    #[test]
    fn capture_skips_unresolvable_rooms() {
        let sdk = SimSdk::new();
        sdk.push_room(SimRoom::new(sim_room_id(0)));
        sdk.push_room(SimRoom::new(sim_room_id(1)));
        sdk.set_room_available(&sim_room_id(1), false);

        let snapshot = SystemSnapshot::capture(&sdk, &SyncState::default());

        assert_eq!(snapshot.feed.len(), 2);
        assert_eq!(snapshot.expected_ids(), vec![&sim_room_id(0)]);
        assert!(snapshot.published_ids().is_empty());
    }
}
