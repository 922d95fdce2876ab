//! Deterministic simulation harness for room-list sync testing.
//!
//! [`SimSdk`] implements the SDK capability traits in memory, so the real
//! session client and coordinator run unmodified in tests, the fuzzer and
//! the demo binary.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the published
//! room list. Operations are applied to both the model and the real
//! coordinator through [`SyncDriver`], and their observable states are
//! compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties of any caught-up
//! published list. Use [`InvariantRegistry::standard()`] for the common set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_sdk;
pub mod sync_driver;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, NoEmptySlots, OnlyResolvableRooms,
    OrderMatchesFeed, SystemSnapshot, UniqueRoomIds, Violation,
};
pub use model::{
    ModelEntry, ModelRoom, ModelRoomId, ModelRoomList, ObservableState, Operation,
    OperationResult, RoomSeed, Slot,
};
pub use sim_sdk::{
    SearchGate, SimFeed, SimMessage, SimOp, SimRoom, SimSdk, SimVerification, sim_room_id,
};
pub use sync_driver::{Divergence, SyncDriver, feeds_agree, observe};
