//! Model-based property tests.
//!
//! These tests generate random feed operation sequences and verify that the
//! real coordinator publishes exactly what the reference model predicts.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!    ModelRoomList   Coordinator      Compare
//!     (reference)    (over SimSdk)    + invariants
//! ```

use proptest::prelude::*;
use roomsync_harness::{
    InvariantRegistry, Operation, OperationResult, SyncDriver, feeds_agree,
};

/// Strategy for generating operations, weighted towards feed changes.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    let slot = any::<u8>();
    let seed = any::<u8>();

    prop_oneof![
        4 => (slot.clone(), seed.clone()).prop_map(|(slot, seed)| Operation::AddRoom { slot, seed }),
        1 => slot.clone().prop_map(|slot| Operation::AddEmpty { slot }),
        2 => slot.clone().prop_map(|slot| Operation::RemoveSlot { slot }),
        2 => slot.clone().prop_map(|slot| Operation::Invalidate { slot }),
        2 => (slot.clone(), slot.clone()).prop_map(|(from, to)| Operation::Move { from, to }),
        2 => (slot.clone(), seed).prop_map(|(slot, seed)| Operation::Touch { slot, seed }),
        2 => (slot, any::<bool>())
            .prop_map(|(slot, available)| Operation::SetAvailable { slot, available }),
        1 => Just(Operation::Notify),
        3 => Just(Operation::Process),
    ]
}

proptest! {
    /// Published state matches the model after every processing step.
    #[test]
    fn prop_model_matches_real(ops in prop::collection::vec(operation_strategy(), 0..80)) {
        let mut driver = SyncDriver::new()
            .unwrap()
            .with_invariants(InvariantRegistry::standard());

        for (i, op) in ops.iter().enumerate() {
            let result = driver.apply(op);
            prop_assert!(result.is_ok(), "divergence at operation {}: {:?}\n{}", i, op, result.unwrap_err());
            prop_assert!(
                feeds_agree(driver.model().entries(), &driver.sdk().entries()),
                "feed diverged from model at operation {}: {:?}", i, op
            );
        }

        let last = driver.apply(&Operation::Process);
        prop_assert!(last.is_ok(), "{}", last.unwrap_err());
    }

    /// Processing twice without an intervening change publishes the same rooms.
    #[test]
    fn prop_repeated_notification_is_idempotent(
        ops in prop::collection::vec(operation_strategy(), 0..40)
    ) {
        let mut driver = SyncDriver::new().unwrap();
        for op in &ops {
            driver.apply(op).unwrap();
        }
        driver.apply(&Operation::Process).unwrap();

        let before = driver.observable_state();
        driver.apply(&Operation::Notify).unwrap();
        prop_assert_eq!(driver.apply(&Operation::Process).unwrap(), OperationResult::Processed(1));
        let after = driver.observable_state();

        prop_assert_eq!(before.rooms, after.rooms);
        prop_assert_eq!(before.notifications + 1, after.notifications);
    }
}

#[test]
fn unavailable_invalidated_room_is_removed() {
    let mut driver = SyncDriver::new().unwrap().with_invariants(InvariantRegistry::standard());

    driver.apply(&Operation::AddRoom { slot: 0, seed: 1 }).unwrap();
    driver.apply(&Operation::AddRoom { slot: 1, seed: 2 }).unwrap();
    driver.apply(&Operation::Process).unwrap();
    assert_eq!(driver.observable_state().rooms.len(), 2);

    driver.apply(&Operation::SetAvailable { slot: 1, available: false }).unwrap();
    driver.apply(&Operation::Invalidate { slot: 1 }).unwrap();
    driver.apply(&Operation::Process).unwrap();

    let rooms = driver.observable_state().rooms;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].1.as_deref(), Some("Room 1"));
}

#[test]
fn silent_room_change_is_picked_up_by_next_pass() {
    let mut driver = SyncDriver::new().unwrap();

    driver.apply(&Operation::AddRoom { slot: 0, seed: 1 }).unwrap();
    driver.apply(&Operation::Process).unwrap();

    driver.apply(&Operation::Touch { slot: 0, seed: 3 }).unwrap();
    assert_eq!(driver.apply(&Operation::Process).unwrap(), OperationResult::Processed(0));
    assert_eq!(driver.observable_state().rooms[0].1.as_deref(), Some("Room 1"));

    driver.apply(&Operation::Notify).unwrap();
    driver.apply(&Operation::Process).unwrap();
    assert_eq!(driver.observable_state().rooms[0].1.as_deref(), Some("Room 3"));
}
