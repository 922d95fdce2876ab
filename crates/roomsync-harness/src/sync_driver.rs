//! Drives the real coordinator and the model side by side.
//!
//! `SyncDriver` owns a session over [`SimSdk`], its [`RoomListCoordinator`],
//! and a [`ModelRoomList`]. Every operation is applied to both; after each
//! processing step the published states are compared and, if enabled, the
//! invariant registry is checked.

use std::fmt;

use roomsync_client::{RoomListCoordinator, SessionClient, SyncState};
use roomsync_core::{InitError, RoomListEntry, SessionConfig};

use crate::{
    InvariantRegistry, ModelEntry, ModelRoomList, ObservableState, Operation, OperationResult,
    RoomSeed, SimRoom, SimSdk, SystemSnapshot, Violation, sim_room_id,
};

/// Mismatch between the real system and the model.
#[derive(Debug, Clone)]
pub enum Divergence {
    /// The coordinator ran a different number of passes than notifications
    /// were queued.
    Passes {
        /// Passes the model expected.
        model: usize,
        /// Passes the coordinator ran.
        real: usize,
    },
    /// Published states differ.
    State {
        /// Model state.
        model: ObservableState,
        /// Real state.
        real: ObservableState,
    },
    /// An invariant failed.
    Invariants(Vec<Violation>),
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passes { model, real } => {
                write!(f, "model expected {model} passes, coordinator ran {real}")
            },
            Self::State { model, real } => {
                write!(f, "published state diverged:\n  model: {model:?}\n  real:  {real:?}")
            },
            Self::Invariants(violations) => {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                write!(f, "invariant violations:\n  {}", messages.join("\n  "))
            },
        }
    }
}

impl std::error::Error for Divergence {}

/// Reduce a published state to what the model tracks.
pub fn observe(state: &SyncState) -> ObservableState {
    ObservableState {
        rooms: state
            .rooms
            .iter()
            .map(|room| (room.id.clone(), room.display_name.clone(), room.unread_count))
            .collect(),
        notifications: state.notifications,
    }
}

/// Real coordinator plus reference model.
pub struct SyncDriver {
    sdk: SimSdk,
    client: SessionClient<SimSdk>,
    coordinator: RoomListCoordinator<SimSdk>,
    model: ModelRoomList,
    invariants: Option<InvariantRegistry>,
}

impl SyncDriver {
    /// Start a session over an empty simulated feed.
    pub fn new() -> Result<Self, InitError> {
        let sdk = SimSdk::new();
        let client = SessionClient::start(sdk.clone(), SessionConfig::default())?;
        let coordinator = RoomListCoordinator::new(&client);
        Ok(Self { sdk, client, coordinator, model: ModelRoomList::new(), invariants: None })
    }

    /// Enable invariant checking after every processing step.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Simulated SDK.
    pub fn sdk(&self) -> &SimSdk {
        &self.sdk
    }

    /// Session over the simulated SDK.
    pub fn client(&self) -> &SessionClient<SimSdk> {
        &self.client
    }

    /// Reference model.
    pub fn model(&self) -> &ModelRoomList {
        &self.model
    }

    /// Currently published real state.
    pub fn observable_state(&self) -> ObservableState {
        observe(&self.coordinator.state())
    }

    /// Snapshot for invariant checks.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::capture(&self.sdk, &self.coordinator.state())
    }

    /// Apply `op` to the simulated feed and the model.
    ///
    /// # Errors
    ///
    /// Returns a [`Divergence`] if, after a processing step, the coordinator
    /// disagrees with the model or an enabled invariant fails.
    pub fn apply(&mut self, op: &Operation) -> Result<OperationResult, Divergence> {
        // Resolve slots against the pre-operation model, which mirrors the feed.
        let real_passes = self.apply_real(op);
        let result = self.model.apply(op);

        if let OperationResult::Processed(model_passes) = result {
            if real_passes != model_passes {
                return Err(Divergence::Passes { model: model_passes, real: real_passes });
            }
            self.check()?;
        }
        Ok(result)
    }

    /// Compare published states and check invariants.
    ///
    /// Only meaningful when no notification is pending.
    pub fn check(&self) -> Result<(), Divergence> {
        let real = self.observable_state();
        let model = self.model.published();
        if &real != model {
            return Err(Divergence::State { model: model.clone(), real });
        }

        if let Some(registry) = &self.invariants {
            registry.check_all(&self.snapshot()).map_err(Divergence::Invariants)?;
        }
        Ok(())
    }

    fn apply_real(&mut self, op: &Operation) -> usize {
        let model = &self.model;
        match *op {
            Operation::AddRoom { slot, seed } => {
                let id = sim_room_id(model.next_room_id());
                let seed = RoomSeed(seed);
                let mut room = SimRoom::new(id.clone()).with_unread(seed.unread());
                room.name = seed.name();
                self.sdk.upsert_room(room);
                self.sdk.insert_entry(model.insert_index(slot), RoomListEntry::Filled(id));
            },
            Operation::AddEmpty { slot } => {
                self.sdk.insert_entry(model.insert_index(slot), RoomListEntry::Empty);
            },
            Operation::RemoveSlot { slot } => {
                if let Some(index) = model.slot_index(slot) {
                    self.sdk.remove_entry(index);
                }
            },
            Operation::Invalidate { slot } => {
                if let Some((_, id)) = model.room_at(slot) {
                    self.sdk.invalidate(&sim_room_id(id));
                }
            },
            Operation::Move { from, to } => {
                if let Some(from) = model.slot_index(from) {
                    // Target position is taken modulo the shortened feed.
                    let to = usize::from(to) % model.entries().len();
                    self.sdk.move_entry(from, to);
                }
            },
            Operation::Touch { slot, seed } => {
                if let Some((_, id)) = model.room_at(slot) {
                    let id = sim_room_id(id);
                    if let Some(mut room) = self.sdk.room(&id) {
                        let seed = RoomSeed(seed);
                        room.name = seed.name();
                        room.unread = seed.unread();
                        self.sdk.upsert_room(room);
                    }
                }
            },
            Operation::SetAvailable { slot, available } => {
                if let Some((_, id)) = model.room_at(slot) {
                    self.sdk.set_room_available(&sim_room_id(id), available);
                }
            },
            Operation::Notify => self.sdk.notify(),
            Operation::Process => return self.coordinator.process_pending(),
        }
        0
    }
}

/// Check that model slots and simulated entries line up.
pub fn feeds_agree(model: &[ModelEntry], real: &[RoomListEntry]) -> bool {
    model.len() == real.len()
        && model.iter().zip(real).all(|(m, r)| match (m, r) {
            (ModelEntry::Empty, RoomListEntry::Empty) => true,
            (ModelEntry::Filled(m), RoomListEntry::Filled(r))
            | (ModelEntry::Invalidated(m), RoomListEntry::Invalidated(r)) => &sim_room_id(*m) == r,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_driver_agrees_with_model() {
        let driver = SyncDriver::new().unwrap();
        assert!(driver.check().is_ok());
        assert_eq!(driver.sdk().listener_count(), 2);
    }

    #[test]
    fn feed_mirrors_model_after_operations() {
        let mut driver = SyncDriver::new().unwrap().with_invariants(InvariantRegistry::standard());
        let ops = [
            Operation::AddRoom { slot: 0, seed: 1 },
            Operation::AddEmpty { slot: 0 },
            Operation::AddRoom { slot: 9, seed: 2 },
            Operation::Move { from: 2, to: 0 },
            Operation::Invalidate { slot: 1 },
            Operation::Process,
        ];

        for op in &ops {
            driver.apply(op).unwrap();
        }

        assert!(feeds_agree(driver.model().entries(), &driver.sdk().entries()));
        assert_eq!(driver.observable_state().rooms.len(), 2);
    }
}
