//! Reference model of the published room list.
//!
//! The model tracks the feed as plain data and computes what a caught-up
//! coordinator must publish. It knows nothing about listeners, channels or
//! caching, which is what makes it a useful oracle.

use std::collections::BTreeMap;

use roomsync_core::RoomId;

use super::operation::{Operation, OperationResult, RoomSeed, Slot};
use crate::sim_room_id;

/// Model room identifier. Maps onto [`sim_room_id`].
pub type ModelRoomId = u64;

/// One slot of the model feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEntry {
    /// Unfilled slot.
    Empty,
    /// Slot with current content.
    Filled(ModelRoomId),
    /// Slot with stale content.
    Invalidated(ModelRoomId),
}

impl ModelEntry {
    /// Room held by the slot.
    pub fn room(self) -> Option<ModelRoomId> {
        match self {
            Self::Empty => None,
            Self::Filled(id) | Self::Invalidated(id) => Some(id),
        }
    }
}

/// Model room state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoom {
    /// Display name.
    pub name: Option<String>,
    /// Unread count.
    pub unread: u64,
    /// Lookups succeed.
    pub available: bool,
}

impl ModelRoom {
    fn from_seed(seed: RoomSeed) -> Self {
        Self { name: seed.name(), unread: seed.unread(), available: true }
    }
}

/// What the coordinator publishes, reduced to the fields the model tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservableState {
    /// `(id, display_name, unread_count)` in published order.
    pub rooms: Vec<(RoomId, Option<String>, u64)>,
    /// Notifications processed.
    pub notifications: u64,
}

/// Reference model of feed and published list.
#[derive(Debug, Clone, Default)]
pub struct ModelRoomList {
    entries: Vec<ModelEntry>,
    rooms: BTreeMap<ModelRoomId, ModelRoom>,
    next_room: ModelRoomId,
    pending: usize,
    published: ObservableState,
}

impl ModelRoomList {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed entries.
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Room state by id.
    pub fn room(&self, id: ModelRoomId) -> Option<&ModelRoom> {
        self.rooms.get(&id)
    }

    /// Id the next added room will get.
    pub fn next_room_id(&self) -> ModelRoomId {
        self.next_room
    }

    /// Notifications not yet processed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Last published state.
    pub fn published(&self) -> &ObservableState {
        &self.published
    }

    /// Insert position for `slot`.
    pub fn insert_index(&self, slot: Slot) -> usize {
        usize::from(slot) % (self.entries.len() + 1)
    }

    /// Existing slot index for `slot`. `None` on an empty feed.
    pub fn slot_index(&self, slot: Slot) -> Option<usize> {
        (!self.entries.is_empty()).then(|| usize::from(slot) % self.entries.len())
    }

    /// Room at the existing slot for `slot`.
    pub fn room_at(&self, slot: Slot) -> Option<(usize, ModelRoomId)> {
        let index = self.slot_index(slot)?;
        self.entries[index].room().map(|id| (index, id))
    }

    /// What a pass over the current feed would publish.
    pub fn expected(&self) -> Vec<(RoomId, Option<String>, u64)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.room())
            .filter_map(|id| {
                let room = self.rooms.get(&id).filter(|room| room.available)?;
                Some((sim_room_id(id), room.name.clone(), room.unread))
            })
            .collect()
    }

    /// Apply an operation to the model.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match *op {
            Operation::AddRoom { slot, seed } => {
                let id = self.next_room;
                self.next_room += 1;
                self.rooms.insert(id, ModelRoom::from_seed(RoomSeed(seed)));
                let index = self.insert_index(slot);
                self.entries.insert(index, ModelEntry::Filled(id));
                OperationResult::Applied
            },
            Operation::AddEmpty { slot } => {
                let index = self.insert_index(slot);
                self.entries.insert(index, ModelEntry::Empty);
                OperationResult::Applied
            },
            Operation::RemoveSlot { slot } => match self.slot_index(slot) {
                Some(index) => {
                    self.entries.remove(index);
                    OperationResult::Applied
                },
                None => OperationResult::Skipped,
            },
            Operation::Invalidate { slot } => match self.room_at(slot) {
                Some((index, id)) => {
                    self.entries[index] = ModelEntry::Invalidated(id);
                    OperationResult::Applied
                },
                None => OperationResult::Skipped,
            },
            Operation::Move { from, to } => match self.slot_index(from) {
                Some(from) => {
                    let entry = self.entries.remove(from);
                    let to = usize::from(to) % (self.entries.len() + 1);
                    self.entries.insert(to, entry);
                    OperationResult::Applied
                },
                None => OperationResult::Skipped,
            },
            Operation::Touch { slot, seed } => match self.room_at(slot) {
                Some((_, id)) => {
                    if let Some(room) = self.rooms.get_mut(&id) {
                        let seed = RoomSeed(seed);
                        room.name = seed.name();
                        room.unread = seed.unread();
                    }
                    OperationResult::Applied
                },
                None => OperationResult::Skipped,
            },
            Operation::SetAvailable { slot, available } => match self.room_at(slot) {
                Some((_, id)) => {
                    if let Some(room) = self.rooms.get_mut(&id) {
                        room.available = available;
                    }
                    OperationResult::Applied
                },
                None => OperationResult::Skipped,
            },
            Operation::Notify => OperationResult::Applied,
            Operation::Process => {
                let passes = self.pending;
                if passes > 0 {
                    self.published = ObservableState {
                        rooms: self.expected(),
                        notifications: self.published.notifications + passes as u64,
                    };
                }
                self.pending = 0;
                OperationResult::Processed(passes)
            },
        };

        if result == OperationResult::Applied && op.notifies() {
            self.pending += 1;
        }
        result
    }
}
