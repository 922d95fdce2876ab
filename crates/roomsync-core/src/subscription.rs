//! Scoped listener registration.
//!
//! A [`Subscription`] owns the release of whatever it was created for. The
//! subscription lives exactly as long as the handle: dropping it (or calling
//! [`Subscription::cancel`]) runs the release closure once.

use std::fmt;

/// Cancellable handle to a registered listener.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when cancelled or dropped.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Release the subscription now.
    pub fn cancel(mut self) {
        self.release_once();
    }

    /// Check if the release closure has not run yet.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}
