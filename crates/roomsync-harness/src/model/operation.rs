//! Operations for model-based testing.
//!
//! Operations represent every way the simulated feed can change plus the
//! coordinator's delivery step. They are generated randomly by proptest (or
//! the fuzzer) and applied to both the model and the real coordinator.

use arbitrary::Arbitrary;

/// Slot selector. Reduced modulo the current feed length when applied.
pub type Slot = u8;

/// Operations that can be applied to the system.
///
/// Feed-shape changes notify listeners. Room-state changes do not: the SDK
/// may update a room without reordering the list, and the next pass must
/// still pick the change up.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Insert a new room.
    AddRoom {
        /// Insert position.
        slot: Slot,
        /// Seed for the room's name and unread count.
        seed: u8,
    },

    /// Insert an empty slot.
    AddEmpty {
        /// Insert position.
        slot: Slot,
    },

    /// Remove a slot.
    RemoveSlot {
        /// Slot to remove.
        slot: Slot,
    },

    /// Mark a room's slot stale.
    Invalidate {
        /// Slot to invalidate. Empty slots are skipped.
        slot: Slot,
    },

    /// Move a slot to another position.
    Move {
        /// Slot to move.
        from: Slot,
        /// Target position.
        to: Slot,
    },

    /// Change a room's name and unread count without notifying.
    Touch {
        /// Slot of the room. Empty slots are skipped.
        slot: Slot,
        /// Seed for the new name and unread count.
        seed: u8,
    },

    /// Make a room's lookup fail or succeed without notifying.
    SetAvailable {
        /// Slot of the room. Empty slots are skipped.
        slot: Slot,
        /// New availability.
        available: bool,
    },

    /// Fire a notification without changing anything.
    Notify,

    /// Let the coordinator process every queued notification.
    Process,
}

impl Operation {
    /// Check if the operation fires a feed notification when applied.
    pub fn notifies(&self) -> bool {
        matches!(
            self,
            Self::AddRoom { .. }
                | Self::AddEmpty { .. }
                | Self::RemoveSlot { .. }
                | Self::Invalidate { .. }
                | Self::Move { .. }
                | Self::Notify
        )
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// The operation changed the system.
    Applied,
    /// The operation had nothing to act on.
    Skipped,
    /// The coordinator ran this many passes.
    Processed(usize),
}

/// Room attributes derived from a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSeed(pub u8);

impl RoomSeed {
    /// Display name. Every eighth seed yields an unnamed room.
    pub fn name(self) -> Option<String> {
        (self.0 % 8 != 0).then(|| format!("Room {}", self.0))
    }

    /// Unread count.
    pub fn unread(self) -> u64 {
        u64::from(self.0 % 5)
    }
}
