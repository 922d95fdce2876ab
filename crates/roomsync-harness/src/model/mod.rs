//! Model-based testing support.
//!
//! [`ModelRoomList`] is the reference implementation. Random [`Operation`]
//! sequences are applied to it and, through [`crate::SyncDriver`], to the
//! real coordinator over the simulated SDK; the observable states must
//! match after every processing step.

mod operation;
mod room_list;

pub use operation::{Operation, OperationResult, RoomSeed, Slot};
pub use room_list::{ModelEntry, ModelRoom, ModelRoomId, ModelRoomList, ObservableState};
