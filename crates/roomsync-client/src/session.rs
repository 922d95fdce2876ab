//! Session facade.
//!
//! [`SessionClient`] is the single authenticated gateway to the SDK. It is
//! cheap to clone; all clones share one session, and the session is torn
//! down exactly once, either by [`SessionClient::shutdown`] or when the last
//! clone is dropped.
//!
//! Long-lived components that only observe the session, such as the room
//! list coordinator, hold a [`WeakSessionClient`] so they never keep a
//! session alive on their own.
//!
//! # Execution model
//!
//! Every SDK call that may touch the network runs on tokio's blocking pool
//! and is awaited by the caller. The only synchronous lookups are
//! [`SessionClient::resolve_room`] and [`SessionClient::room_list_snapshot`],
//! which read local sync state.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, Weak,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use roomsync_core::{
    InitError, ListenerId, MediaSource, RoomId, RoomListEntry, SessionConfig, SessionError,
    SessionSdk, Subscription, SyncFeed, UserId, UserProfile,
};
use tokio::sync::{broadcast, mpsc};

/// Capacity of the session callback channel. Slow receivers observe a lag
/// instead of blocking the SDK's delivery thread.
const CALLBACK_CAPACITY: usize = 64;

/// Session-level events re-published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCallback {
    /// The SDK reported a sync update.
    ReceivedSyncUpdate,
    /// The room-list coordinator published a new room list.
    UpdatedRoomsList,
}

/// Stream of payload-free room-list change notifications.
///
/// Owns the feed listener registration: dropping the stream unregisters it.
/// The stream ends (`recv` returns `None`) once the session is shut down.
#[derive(Debug)]
pub struct RoomListUpdates {
    receiver: mpsc::UnboundedReceiver<()>,
    _subscription: Subscription,
}

impl RoomListUpdates {
    /// Wait for the next change notification. `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.receiver.recv().await
    }

    /// Take a queued notification without waiting.
    pub fn try_recv(&mut self) -> Option<()> {
        self.receiver.try_recv().ok()
    }
}

/// Listener ids registered on the feed through this session.
type ListenerRegistry = Arc<Mutex<Vec<ListenerId>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ownership of the authenticated connection and the feed subscriptions.
///
/// Exclusively owned by the [`SessionClient`] clones through an `Arc`.
struct SessionHandle<S: SessionSdk> {
    sdk: Arc<S>,
    user_id: UserId,
    config: SessionConfig,
    feed: Arc<S::Feed>,
    listeners: ListenerRegistry,
    callbacks: broadcast::Sender<SessionCallback>,
    torn_down: AtomicBool,
}

impl<S: SessionSdk> SessionHandle<S> {
    /// Unregister every listener and stop sync. Runs at most once.
    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let ids = std::mem::take(&mut *lock(&self.listeners));
        for id in ids {
            self.feed.remove_listener(id);
        }
        self.sdk.stop_sync();

        tracing::info!(user_id = %self.user_id, "session torn down");
    }
}

impl<S: SessionSdk> Drop for SessionHandle<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Authenticated gateway to all remote operations.
pub struct SessionClient<S: SessionSdk> {
    handle: Arc<SessionHandle<S>>,
}

impl<S: SessionSdk> Clone for SessionClient<S> {
    fn clone(&self) -> Self {
        Self { handle: Arc::clone(&self.handle) }
    }
}

/// Non-owning view of a session.
///
/// Does not keep the session alive: once every [`SessionClient`] clone is
/// gone, [`WeakSessionClient::upgrade`] returns `None`.
pub struct WeakSessionClient<S: SessionSdk> {
    handle: Weak<SessionHandle<S>>,
}

impl<S: SessionSdk> Clone for WeakSessionClient<S> {
    fn clone(&self) -> Self {
        Self { handle: Weak::clone(&self.handle) }
    }
}

impl<S: SessionSdk> WeakSessionClient<S> {
    /// The session, if a [`SessionClient`] still holds it and it has not
    /// been shut down.
    pub fn upgrade(&self) -> Option<SessionClient<S>> {
        let handle = self.handle.upgrade()?;
        if handle.torn_down.load(Ordering::SeqCst) {
            return None;
        }
        Some(SessionClient { handle })
    }
}

impl<S: SessionSdk> SessionClient<S> {
    /// Establish the session: read the user id, open the room-list feed and
    /// start background synchronization.
    ///
    /// Synchronization starts immediately and cannot be paused short of
    /// [`SessionClient::shutdown`].
    ///
    /// # Errors
    ///
    /// Any failure here is fatal: no partially-constructed session is
    /// returned, and nothing registered on the feed is left behind.
    pub fn start(sdk: S, config: SessionConfig) -> Result<Self, InitError> {
        config.validate()?;

        let user_id = sdk.user_id().map_err(|e| {
            tracing::error!(error = %e, "failed reading user id");
            InitError::UserIdUnavailable(e)
        })?;

        let feed = sdk.open_feed(&config.feed).map_err(|e| {
            tracing::error!(%user_id, error = %e, "failed opening room-list feed");
            InitError::FeedUnavailable(e)
        })?;
        let feed = Arc::new(feed);

        let (callbacks, _) = broadcast::channel(CALLBACK_CAPACITY);
        let sync_callbacks = callbacks.clone();
        let sync_listener = feed.on_update(Box::new(move || {
            // No receivers is fine: nobody is observing session callbacks yet.
            let _ = sync_callbacks.send(SessionCallback::ReceivedSyncUpdate);
        }));

        if let Err(e) = sdk.start_sync() {
            feed.remove_listener(sync_listener);
            tracing::error!(%user_id, error = %e, "failed starting sync");
            return Err(InitError::SyncStartFailed(e));
        }

        tracing::info!(%user_id, feed = %config.feed.name, "session started");

        let handle = SessionHandle {
            sdk: Arc::new(sdk),
            user_id,
            config,
            feed,
            listeners: Arc::new(Mutex::new(vec![sync_listener])),
            callbacks,
            torn_down: AtomicBool::new(false),
        };
        Ok(Self { handle: Arc::new(handle) })
    }

    /// Authenticated user id. Always available once the session exists.
    pub fn current_user_id(&self) -> &UserId {
        &self.handle.user_id
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.handle.config
    }

    /// Non-owning view of this session.
    pub fn downgrade(&self) -> WeakSessionClient<S> {
        WeakSessionClient { handle: Arc::downgrade(&self.handle) }
    }

    /// Check if the session has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.handle.torn_down.load(Ordering::SeqCst)
    }

    /// Subscribe to session-level callbacks.
    pub fn callbacks(&self) -> broadcast::Receiver<SessionCallback> {
        self.handle.callbacks.subscribe()
    }

    /// Publish a session-level callback to all observers.
    pub(crate) fn publish(&self, callback: SessionCallback) {
        let _ = self.handle.callbacks.send(callback);
    }

    /// Register for room-list change notifications.
    ///
    /// After shutdown this returns a stream that is already closed.
    pub fn subscribe_room_list(&self) -> RoomListUpdates {
        let (sender, receiver) = mpsc::unbounded_channel();

        if self.is_shut_down() {
            return RoomListUpdates { receiver, _subscription: Subscription::new(|| {}) };
        }

        let id = self.handle.feed.on_update(Box::new(move || {
            let _ = sender.send(());
        }));
        lock(&self.handle.listeners).push(id);

        // Shutdown may have run between the check and the registration.
        if self.is_shut_down() {
            self.handle.feed.remove_listener(id);
        }

        let feed = Arc::clone(&self.handle.feed);
        let listeners = Arc::clone(&self.handle.listeners);
        let subscription = Subscription::new(move || {
            lock(&listeners).retain(|registered| *registered != id);
            feed.remove_listener(id);
        });

        RoomListUpdates { receiver, _subscription: subscription }
    }

    /// Ordered room-list entries as currently known to the feed.
    pub fn room_list_snapshot(&self) -> Vec<RoomListEntry> {
        self.handle.feed.current_snapshot()
    }

    /// Look up a room in the locally-synced room list.
    ///
    /// Not a network round trip; safe to call from the serial context.
    pub fn resolve_room(&self, room_id: &RoomId) -> Result<S::Room, SessionError> {
        self.ensure_running()?;
        self.handle.sdk.get_room(room_id).map_err(|e| {
            tracing::trace!(%room_id, error = %e, "room lookup failed");
            SessionError::RoomNotFound { room_id: room_id.clone() }
        })
    }

    /// Resolve a richer per-room handle. May block on I/O, so it runs on
    /// the blocking pool.
    pub async fn open_room(&self, room_id: &RoomId) -> Result<S::RoomDetail, SessionError> {
        let room_id = room_id.clone();
        self.run_blocking(move |sdk| {
            sdk.get_room_detail(&room_id).map_err(|e| {
                tracing::warn!(%room_id, error = %e, "failed opening room");
                SessionError::RoomNotFound { room_id }
            })
        })
        .await
    }

    /// Load the user's display name. Failures are not retried.
    pub async fn load_display_name(&self) -> Result<String, SessionError> {
        self.run_blocking(|sdk| {
            sdk.display_name()
                .map_err(|e| SessionError::DisplayNameUnavailable { reason: e.to_string() })
        })
        .await
    }

    /// Load the user's avatar URL. Failures are not retried.
    pub async fn load_avatar_url(&self) -> Result<String, SessionError> {
        self.run_blocking(|sdk| {
            sdk.avatar_url().map_err(|e| SessionError::AvatarUnavailable { reason: e.to_string() })
        })
        .await
    }

    /// Build a media descriptor for a content URL.
    pub fn media_source_for_url(&self, url: &str) -> MediaSource {
        self.handle.sdk.media_source_from_url(url)
    }

    /// Fetch raw bytes for a media descriptor.
    pub async fn fetch_media(&self, source: MediaSource) -> Result<Bytes, SessionError> {
        self.run_blocking(move |sdk| {
            sdk.fetch_media(&source).map_err(|e| {
                tracing::debug!(url = source.url(), error = %e, "media fetch failed");
                SessionError::MediaFetchFailed { reason: e.to_string() }
            })
        })
        .await
    }

    /// Acquire the session verification controller.
    pub async fn acquire_verification_controller(
        &self,
    ) -> Result<S::Verification, SessionError> {
        self.run_blocking(|sdk| {
            sdk.verification_controller().map_err(|e| {
                tracing::warn!(error = %e, "failed retrieving session verification controller");
                SessionError::VerificationControllerUnavailable { reason: e.to_string() }
            })
        })
        .await
    }

    /// Existing direct room with `user_id`. `None` if there is none.
    pub async fn direct_room_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RoomId>, SessionError> {
        let user_id = user_id.clone();
        self.run_blocking(move |sdk| {
            sdk.direct_room_for_user(&user_id).map_err(|e| {
                tracing::warn!(%user_id, error = %e, "direct room lookup failed");
                SessionError::DirectRoomOperationFailed
            })
        })
        .await
    }

    /// Create a direct room with `user_id`.
    pub async fn create_direct_room(
        &self,
        user_id: &UserId,
        suggested_name: Option<String>,
    ) -> Result<RoomId, SessionError> {
        let user_id = user_id.clone();
        self.run_blocking(move |sdk| {
            sdk.create_direct_room(&user_id, suggested_name.as_deref()).map_err(|e| {
                tracing::warn!(%user_id, error = %e, "direct room creation failed");
                SessionError::DirectRoomOperationFailed
            })
        })
        .await
    }

    /// Return the existing direct room with `user_id`, creating one if
    /// there is none.
    ///
    /// Concurrent calls for the same user are not deduplicated here; the
    /// SDK's room-creation semantics decide whether two rooms can result.
    pub async fn find_or_create_direct_room(
        &self,
        user_id: &UserId,
        suggested_name: Option<String>,
    ) -> Result<RoomId, SessionError> {
        if let Some(room_id) = self.direct_room_for_user(user_id).await? {
            tracing::debug!(%user_id, %room_id, "reusing existing direct room");
            return Ok(room_id);
        }
        self.create_direct_room(user_id, suggested_name).await
    }

    /// Search the user directory.
    pub async fn search_profiles(&self, query: String) -> Result<Vec<UserProfile>, SessionError> {
        self.run_blocking(move |sdk| {
            sdk.search_profiles(&query)
                .map_err(|e| SessionError::ProfileSearchFailed { reason: e.to_string() })
        })
        .await
    }

    /// Users the account recently talked to.
    pub async fn recent_conversation_counterparts(&self) -> Result<Vec<UserProfile>, SessionError> {
        self.run_blocking(|sdk| Ok(sdk.recent_conversation_counterparts())).await
    }

    /// Tear the session down: unregister every feed listener and stop sync.
    ///
    /// Idempotent. Room-list streams obtained from
    /// [`SessionClient::subscribe_room_list`] end after this call.
    pub fn shutdown(&self) {
        self.handle.teardown();
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.is_shut_down() { Err(SessionError::SessionClosed) } else { Ok(()) }
    }

    /// Run an SDK call on the blocking pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, SessionError> + Send + 'static,
    {
        self.ensure_running()?;
        let sdk = Arc::clone(&self.handle.sdk);
        tokio::task::spawn_blocking(move || op(&sdk))
            .await
            .map_err(|e| SessionError::TaskFailed { reason: e.to_string() })?
    }
}
