//! Invariant checking for room-list synchronization.
//!
//! Invariants are properties that must always hold once the coordinator has
//! caught up with the feed. Unlike example-based tests that check specific
//! scenarios, invariants verify behavioral properties across arbitrary
//! sequences of feed changes.
//!
//! # Architecture
//!
//! Observable state is captured from the simulated SDK and the published
//! [`roomsync_client::SyncState`] into a [`SystemSnapshot`], then every
//! registered [`Invariant`] is checked against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = SystemSnapshot::capture(&sdk, &coordinator.state());
//! registry.assert_all(&snapshot, "after pass");
//! ```

mod checks;
mod snapshot;

pub use checks::{NoEmptySlots, OnlyResolvableRooms, OrderMatchesFeed, UniqueRoomIds};
pub use snapshot::SystemSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against a snapshot.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard room-list invariants.
    ///
    /// Includes:
    /// - [`OrderMatchesFeed`]: published order equals feed order
    /// - [`NoEmptySlots`]: every summary comes from a non-empty slot
    /// - [`OnlyResolvableRooms`]: no summary for a room that fails lookup
    /// - [`UniqueRoomIds`]: no room is published twice
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(OrderMatchesFeed);
        registry.add(NoEmptySlots);
        registry.add(OnlyResolvableRooms);
        registry.add(UniqueRoomIds);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated. Meant for tests.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
