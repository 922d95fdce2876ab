//! Fuzz target for the room-list coordinator under arbitrary feed churn
//!
//! Drives a real session and coordinator over the simulated SDK next to the
//! reference model, one arbitrary operation at a time.
//!
//! # Strategy
//!
//! - Insertions, removals, moves and placeholder slots in any order
//! - Room invalidation and availability flips between notifications
//! - Silent room changes followed by notifications
//! - Notifications queued in bursts before being processed
//!
//! # Invariants
//!
//! - The coordinator NEVER panics, whatever the feed looks like
//! - One pass per queued notification
//! - Published rooms follow feed order, without placeholders or duplicates
//! - Only resolvable rooms are published
//! - Published state matches the model after every processing step

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roomsync_harness::{InvariantRegistry, Operation, SyncDriver};

#[derive(Debug, Arbitrary)]
struct Scenario {
    operations: Vec<Operation>,
}

fuzz_target!(|scenario: Scenario| {
    let Ok(driver) = SyncDriver::new() else {
        return;
    };
    let mut driver = driver.with_invariants(InvariantRegistry::standard());

    for op in scenario.operations.iter().take(256) {
        if let Err(divergence) = driver.apply(op) {
            panic!("{op:?}: {divergence}");
        }
    }

    // Drain whatever is still queued.
    if let Err(divergence) = driver.apply(&Operation::Process) {
        panic!("final process: {divergence}");
    }
});
