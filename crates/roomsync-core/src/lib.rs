//! Room-list sync core
//!
//! Domain types and capability traits shared by every layer of the session
//! core. Nothing in this crate performs I/O: the external protocol SDK is
//! consumed exclusively through the traits in [`sdk`], and every other crate
//! builds on the plain data types defined here.
//!
//! # Components
//!
//! - [`RoomListEntry`]: one slot of the feed's ordered room list
//! - [`RoomSummary`]: UI-agnostic projection of a single room
//! - [`SessionSdk`] / [`SyncFeed`]: the capability boundary with the SDK
//! - [`Subscription`]: scoped release of a registered listener
//! - [`SessionError`] / [`InitError`]: the error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod entry;
pub mod error;
pub mod ids;
pub mod media;
pub mod profile;
pub mod sdk;
pub mod subscription;
pub mod summary;

pub use config::{FeedConfig, SessionConfig, SortKey, SyncMode};
pub use entry::RoomListEntry;
pub use error::{ConfigError, IdError, InitError, SdkError, SessionError};
pub use ids::{RoomId, UserId};
pub use media::MediaSource;
pub use profile::UserProfile;
pub use sdk::{
    ListenerId, MessageHandle, RoomView, SessionSdk, SyncFeed, UpdateListener,
    VerificationController,
};
pub use subscription::Subscription;
pub use summary::RoomSummary;
