//! Capability boundary with the external protocol SDK.
//!
//! The SDK performs all cryptography, sync-state management and room-state
//! storage. The core consumes it only through these traits, so the same
//! coordination code runs against the production SDK and against the
//! in-memory simulation used in tests.
//!
//! The traits are synchronous, mirroring the SDK's own bindings. Calls may
//! block on network I/O; the session facade is responsible for running them
//! off the serial delivery context.

use bytes::Bytes;

use crate::{
    FeedConfig, MediaSource, RoomId, RoomListEntry, SdkError, UserId, UserProfile,
};

/// Token identifying a registered feed listener.
pub type ListenerId = u64;

/// Payload-free change notification callback.
///
/// Invoked from the SDK's background context every time the feed's room list
/// changes. Implementations must not block.
pub type UpdateListener = Box<dyn Fn() + Send + Sync + 'static>;

/// Lazily-updated, ordered room-list feed owned by the SDK.
pub trait SyncFeed: Send + Sync + 'static {
    /// Ordered room-list entries as of now.
    fn current_snapshot(&self) -> Vec<RoomListEntry>;

    /// Register a change listener.
    ///
    /// The listener stays registered until [`SyncFeed::remove_listener`] is
    /// called with the returned id.
    fn on_update(&self, listener: UpdateListener) -> ListenerId;

    /// Unregister a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// A message event handle.
pub trait MessageHandle {
    /// Textual projection of the message. `None` for message types without
    /// one (images, files, unsupported events).
    fn body(&self) -> Option<String>;
}

/// Read access to a room's presentation-relevant state.
pub trait RoomView: Send + Sync + 'static {
    /// Message handle type for the latest event.
    type Message: MessageHandle;

    /// Room identifier.
    fn room_id(&self) -> RoomId;

    /// Computed room name. `None` if the room has no usable name.
    fn name(&self) -> Option<String>;

    /// Most recent message. `None` if the room has none yet.
    fn latest_message(&self) -> Option<Self::Message>;

    /// Unread notification count.
    fn unread_count(&self) -> u64;

    /// Room is a direct chat.
    fn is_direct(&self) -> bool;

    /// Room has encryption enabled.
    fn is_encrypted(&self) -> bool;
}

/// Session verification controller.
///
/// The verification state machine itself lives in the SDK; the core only
/// drives it and observes the outcome of each step.
pub trait VerificationController: Send + Sync + 'static {
    /// Check if the current session is already verified.
    fn is_verified(&self) -> bool;

    /// Ask another session to verify this one.
    fn request_verification(&self) -> Result<(), SdkError>;

    /// Confirm that the emoji/decimal comparison matched.
    fn approve_verification(&self) -> Result<(), SdkError>;

    /// Report that the comparison did not match.
    fn decline_verification(&self) -> Result<(), SdkError>;

    /// Abort the running verification flow.
    fn cancel_verification(&self) -> Result<(), SdkError>;
}

/// Authenticated SDK client.
///
/// # Invariants
///
/// - `user_id()` is stable for the lifetime of the client
/// - `get_room()` answers from local sync state only and never touches the
///   network
/// - `stop_sync()` is idempotent
pub trait SessionSdk: Send + Sync + 'static {
    /// Feed type produced by [`SessionSdk::open_feed`].
    type Feed: SyncFeed;
    /// Lightweight room handle backed by local sync state.
    type Room: RoomView;
    /// Richer per-room handle that may require I/O to build.
    type RoomDetail: RoomView;
    /// Verification controller type.
    type Verification: VerificationController;

    /// Authenticated user id.
    fn user_id(&self) -> Result<UserId, SdkError>;

    /// Open the room-list feed with the given configuration.
    fn open_feed(&self, config: &FeedConfig) -> Result<Self::Feed, SdkError>;

    /// Start continuous background synchronization.
    fn start_sync(&self) -> Result<(), SdkError>;

    /// Stop background synchronization.
    fn stop_sync(&self);

    /// Look up a room in the locally-synced room list.
    fn get_room(&self, room_id: &RoomId) -> Result<Self::Room, SdkError>;

    /// Build a detailed room handle. May block on I/O.
    fn get_room_detail(&self, room_id: &RoomId) -> Result<Self::RoomDetail, SdkError>;

    /// Own display name. Remote round-trip.
    fn display_name(&self) -> Result<String, SdkError>;

    /// Own avatar URL. Remote round-trip.
    fn avatar_url(&self) -> Result<String, SdkError>;

    /// Build a media descriptor from a content URL.
    fn media_source_from_url(&self, url: &str) -> MediaSource {
        MediaSource::from_url(url)
    }

    /// Fetch raw media bytes.
    fn fetch_media(&self, source: &MediaSource) -> Result<Bytes, SdkError>;

    /// Acquire the session verification controller.
    fn verification_controller(&self) -> Result<Self::Verification, SdkError>;

    /// Existing direct room with `user_id`. `None` if there is none.
    fn direct_room_for_user(&self, user_id: &UserId) -> Result<Option<RoomId>, SdkError>;

    /// Create a direct room with `user_id`.
    fn create_direct_room(
        &self,
        user_id: &UserId,
        suggested_name: Option<&str>,
    ) -> Result<RoomId, SdkError>;

    /// Search the user directory.
    fn search_profiles(&self, query: &str) -> Result<Vec<UserProfile>, SdkError>;

    /// Users the account recently talked to, used as search suggestions.
    fn recent_conversation_counterparts(&self) -> Vec<UserProfile>;
}
