//! Room list coordinator.
//!
//! The coordinator is the single writer of [`SyncState`]. It subscribes once
//! to the session's room-list feed and, for every change notification, runs
//! a full resync pass: read the current snapshot, resolve every non-empty
//! entry in order, and replace the published state wholesale.
//!
//! The model is level-triggered. A pass always reflects the feed as it is
//! when the pass runs, so redundant notifications only cause redundant
//! passes, and intermediate feed states that were never observed are never
//! published.
//!
//! # Delivery context
//!
//! Passes run on whichever task owns the coordinator: either
//! [`RoomListCoordinator::run`] on a spawned task, or a caller driving
//! [`RoomListCoordinator::process_pending`] from its own serial loop. Taking
//! `&mut self` for every pass is what makes two concurrent passes
//! impossible.
//!
//! # Lifetime
//!
//! The coordinator holds the session weakly. Dropping the last
//! [`SessionClient`] tears the session down, which closes the feed stream and
//! ends [`RoomListCoordinator::run`].

use std::sync::Arc;

use roomsync_core::{RoomId, RoomSummary, SessionSdk, UserId};
use tokio::sync::watch;

use crate::{
    RoomListUpdates, RoomSummaryResolver, SessionCallback, SessionClient, WeakSessionClient,
};

/// Published room-list state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Summaries in feed order, with empty and unresolvable slots elided.
    pub rooms: Vec<RoomSummary>,
    /// Feed notifications processed so far.
    pub notifications: u64,
}

impl SyncState {
    /// Room ids in published order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|room| room.id.clone()).collect()
    }
}

/// Keeps [`SyncState`] a faithful projection of the session's room-list feed.
pub struct RoomListCoordinator<S: SessionSdk> {
    session: WeakSessionClient<S>,
    user_id: UserId,
    resolver: RoomSummaryResolver<S>,
    updates: RoomListUpdates,
    state: watch::Sender<Arc<SyncState>>,
}

impl<S: SessionSdk> RoomListCoordinator<S> {
    /// Subscribe to the session's feed and publish the initial room list.
    pub fn new(client: &SessionClient<S>) -> Self {
        let updates = client.subscribe_room_list();
        let resolver = RoomSummaryResolver::new(client);
        let (state, _) = watch::channel(Arc::new(SyncState::default()));

        let mut coordinator = Self {
            session: client.downgrade(),
            user_id: client.current_user_id().clone(),
            resolver,
            updates,
            state,
        };
        coordinator.pass(0);
        coordinator
    }

    /// Observe published states. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SyncState>> {
        self.state.subscribe()
    }

    /// Currently published state.
    pub fn state(&self) -> Arc<SyncState> {
        Arc::clone(&self.state.borrow())
    }

    /// Run one pass for every notification queued since the last call.
    ///
    /// Returns the number of passes run.
    pub fn process_pending(&mut self) -> usize {
        let mut passes = 0;
        while self.updates.try_recv().is_some() {
            self.on_notification();
            passes += 1;
        }
        passes
    }

    /// Run a pass without a feed notification.
    ///
    /// The notification counter is left unchanged.
    pub fn resync(&mut self) {
        let notifications = self.state.borrow().notifications;
        self.pass(notifications);
    }

    /// Process notifications in delivery order until the session shuts down
    /// or its last client is dropped.
    ///
    /// On exit the published state is reset to an empty room list.
    pub async fn run(mut self) {
        while self.updates.recv().await.is_some() {
            self.on_notification();
        }

        self.state.send_replace(Arc::new(SyncState::default()));
        tracing::debug!(user_id = %self.user_id, "room list coordinator stopped");
    }

    fn on_notification(&mut self) {
        let notifications = self.state.borrow().notifications.saturating_add(1);
        self.pass(notifications);
    }

    fn pass(&mut self, notifications: u64) {
        let Some(client) = self.session.upgrade() else {
            tracing::debug!(user_id = %self.user_id, "session gone, skipping resync pass");
            return;
        };
        let entries = client.room_list_snapshot();

        let rooms: Vec<RoomSummary> = entries
            .iter()
            .filter_map(|entry| entry.room_id())
            .filter_map(|room_id| self.resolver.resolve(room_id))
            .collect();

        tracing::debug!(
            entries = entries.len(),
            rooms = rooms.len(),
            notifications,
            "room list resync pass"
        );

        self.state.send_replace(Arc::new(SyncState { rooms, notifications }));
        client.publish(SessionCallback::UpdatedRoomsList);
    }
}
