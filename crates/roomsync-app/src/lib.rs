//! Application layer for roomsync
//!
//! Pure view-model state machines for the home and start-chat screens, plus
//! the bridge and runtime that connect them to the session client. Rendering
//! and navigation stay with the platform through the [`Presenter`] trait.
//!
//! # Components
//!
//! - [`HomeScreen`]: room list, own profile, verification banner, filtering
//! - [`StartChatScreen`]: user search and direct-chat creation
//! - [`Bridge`]: executes screen actions against the session client
//! - [`Runtime`]: forwards published room lists and callbacks to the home
//!   screen

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod bridge;
mod event;
mod home;
mod runtime;
mod start_chat;
mod state;

pub use action::{HomeAction, StartChatAction};
pub use bridge::Bridge;
pub use event::{HomeEvent, StartChatEvent};
pub use home::HomeScreen;
pub use runtime::{Presenter, Runtime};
pub use start_chat::StartChatScreen;
pub use state::{START_CHAT_FAILED, StartChatAlert};
