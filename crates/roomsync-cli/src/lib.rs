//! Simulated end-to-end session for roomsync.
//!
//! Drives the session client, room-list coordinator and home runtime against
//! an in-process simulated SDK, applying seeded feed mutations and checking
//! the published room list after each one.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod demo;
mod error;

pub use demo::{DemoConfig, DemoReport, run};
pub use error::DemoError;
