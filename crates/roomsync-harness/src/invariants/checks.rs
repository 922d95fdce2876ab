//! Standard invariant checks.
//!
//! These invariants capture what a caught-up coordinator must publish for
//! any feed, not specific scenarios.

use std::collections::HashSet;

use roomsync_core::RoomListEntry;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// Published order must equal feed order.
///
/// The published ids are exactly the feed's non-empty, resolvable slots in
/// feed order. Any reordering, stale entry or missing room violates this.
pub struct OrderMatchesFeed;

impl Invariant for OrderMatchesFeed {
    fn name(&self) -> &'static str {
        "OrderMatchesFeed"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let expected = state.expected_ids();
        let published = state.published_ids();
        if expected != published {
            return Err(Violation {
                invariant: self.name(),
                message: format!("expected {expected:?}, published {published:?}"),
            });
        }
        Ok(())
    }
}

/// Every published summary must come from a non-empty feed slot.
///
/// Empty slots produce no placeholder, and a room that left the feed must
/// leave the published list with it.
pub struct NoEmptySlots;

impl Invariant for NoEmptySlots {
    fn name(&self) -> &'static str {
        "NoEmptySlots"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let in_feed: HashSet<_> = state.feed.iter().filter_map(RoomListEntry::room_id).collect();
        let non_empty = state.feed.iter().filter(|e| !e.is_empty()).count();

        if state.published.len() > non_empty {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} summaries published for {} non-empty slots",
                    state.published.len(),
                    non_empty
                ),
            });
        }

        for room in &state.published {
            if !in_feed.contains(&room.id) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("room {} published without a feed slot", room.id),
                });
            }
        }
        Ok(())
    }
}

/// Rooms whose lookup fails must not be published.
///
/// A failed resolution drops the room; it never leaves a stale summary
/// behind.
pub struct OnlyResolvableRooms;

impl Invariant for OnlyResolvableRooms {
    fn name(&self) -> &'static str {
        "OnlyResolvableRooms"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for room in &state.published {
            if !state.resolvable.contains(&room.id) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("unresolvable room {} published", room.id),
                });
            }
        }
        Ok(())
    }
}

/// No room id may be published twice.
pub struct UniqueRoomIds;

impl Invariant for UniqueRoomIds {
    fn name(&self) -> &'static str {
        "UniqueRoomIds"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        for room in &state.published {
            if !seen.insert(&room.id) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("room {} published twice", room.id),
                });
            }
        }
        Ok(())
    }
}
