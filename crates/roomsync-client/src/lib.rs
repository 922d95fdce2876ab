//! Session client
//!
//! Session-facing coordination on top of the SDK capability traits in
//! [`roomsync_core`]: the authenticated gateway, the live room list, and the
//! one-shot verification and discovery operations.
//!
//! # Architecture
//!
//! The [`SessionClient`] is the only component that talks to the SDK. It owns
//! the room-list feed for the lifetime of the session and runs every
//! potentially-blocking SDK call on tokio's blocking pool, so callers on the
//! serial delivery context never block.
//!
//! The [`RoomListCoordinator`] subscribes once to the feed and, for every
//! change notification, rebuilds the complete [`SyncState`] through the
//! [`RoomSummaryResolver`]. It is the single writer of that state. Neither
//! keeps the session alive: both hold a [`WeakSessionClient`].
//!
//! # Components
//!
//! - [`SessionClient`]: authenticated gateway, feed ownership, teardown
//! - [`RoomSummaryResolver`]: room id to [`roomsync_core::RoomSummary`]
//! - [`RoomListCoordinator`]: full-resync projection of the feed
//! - [`verify_session`] / [`SessionVerification`]: session verification
//! - [`ProfileSearch`]: cancellable user directory search
//! - [`start_direct_chat`] / [`lookup_direct_chat`]: direct-message rooms

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;
mod direct_chat;
mod discovery;
mod resolver;
mod session;
mod verification;

pub use coordinator::{RoomListCoordinator, SyncState};
pub use direct_chat::{DirectChatLookup, lookup_direct_chat, start_direct_chat};
pub use discovery::{ProfileSearch, SearchOutcome, UsersSection, UsersSectionKind};
pub use resolver::{RoomSummaryResolver, summarize};
pub use roomsync_core::{InitError, RoomId, SessionError, UserId};
pub use session::{RoomListUpdates, SessionCallback, SessionClient, WeakSessionClient};
pub use verification::{SessionVerification, VerificationState, verify_session};
