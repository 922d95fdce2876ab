//! In-memory SDK for deterministic tests.
//!
//! [`SimSdk`] implements the SDK capability traits over a shared in-memory
//! state. Tests drive the feed directly (replace entries, add or invalidate
//! rooms, fire notifications), script per-operation failures, and read call
//! counters afterwards.
//!
//! Feed listeners run synchronously on the thread that mutates the feed,
//! which models the SDK's background delivery context: the client must
//! marshal the signal onto its own serial context.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, mpsc},
};

use bytes::Bytes;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomsync_core::{
    FeedConfig, ListenerId, MediaSource, MessageHandle, RoomId, RoomListEntry, RoomView, SdkError,
    SessionSdk, SyncFeed, UpdateListener, UserId, UserProfile, VerificationController,
};

/// SDK operations that can be scripted to fail and are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOp {
    /// `user_id`
    UserId,
    /// `open_feed`
    OpenFeed,
    /// `start_sync`
    StartSync,
    /// `get_room`
    GetRoom,
    /// `get_room_detail`
    GetRoomDetail,
    /// `display_name`
    DisplayName,
    /// `avatar_url`
    AvatarUrl,
    /// `fetch_media`
    FetchMedia,
    /// `verification_controller`
    VerificationController,
    /// Any step on an acquired verification controller.
    VerificationStep,
    /// `direct_room_for_user`
    DirectRoomLookup,
    /// `create_direct_room`
    CreateDirectRoom,
    /// `search_profiles`
    SearchProfiles,
}

/// Latest message of a simulated room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimMessage {
    body: Option<String>,
}

impl SimMessage {
    /// Text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self { body: Some(body.into()) }
    }

    /// Message without a textual projection (image, file).
    pub fn non_text() -> Self {
        Self { body: None }
    }
}

impl MessageHandle for SimMessage {
    fn body(&self) -> Option<String> {
        self.body.clone()
    }
}

/// Simulated room state. Doubles as the SDK's room handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRoom {
    /// Room id.
    pub id: RoomId,
    /// Computed name.
    pub name: Option<String>,
    /// Latest message.
    pub latest: Option<SimMessage>,
    /// Unread notification count.
    pub unread: u64,
    /// Direct chat flag.
    pub is_direct: bool,
    /// Encryption flag.
    pub is_encrypted: bool,
}

impl SimRoom {
    /// Unnamed room with no messages.
    pub fn new(id: RoomId) -> Self {
        Self { id, name: None, latest: None, unread: 0, is_direct: false, is_encrypted: false }
    }

    /// Set the room name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the unread count.
    #[must_use]
    pub fn with_unread(mut self, unread: u64) -> Self {
        self.unread = unread;
        self
    }

    /// Set the latest message.
    #[must_use]
    pub fn with_message(mut self, message: SimMessage) -> Self {
        self.latest = Some(message);
        self
    }

    /// Mark as direct chat.
    #[must_use]
    pub fn direct(mut self) -> Self {
        self.is_direct = true;
        self
    }

    /// Mark as encrypted.
    #[must_use]
    pub fn encrypted(mut self) -> Self {
        self.is_encrypted = true;
        self
    }
}

impl RoomView for SimRoom {
    type Message = SimMessage;

    fn room_id(&self) -> RoomId {
        self.id.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn latest_message(&self) -> Option<SimMessage> {
        self.latest.clone()
    }

    fn unread_count(&self) -> u64 {
        self.unread
    }

    fn is_direct(&self) -> bool {
        self.is_direct
    }

    fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }
}

/// Holds a gated search response until released or dropped.
#[derive(Debug)]
pub struct SearchGate {
    release: mpsc::Sender<()>,
}

impl SearchGate {
    /// Let the held search respond.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

type SharedListener = Arc<dyn Fn() + Send + Sync + 'static>;

struct SimState {
    user_id: UserId,
    entries: Vec<RoomListEntry>,
    rooms: HashMap<RoomId, SimRoom>,
    unavailable: HashSet<RoomId>,
    listeners: BTreeMap<ListenerId, SharedListener>,
    next_listener: ListenerId,
    failures: HashSet<SimOp>,
    calls: HashMap<SimOp, usize>,
    display_name: String,
    avatar_url: String,
    media: HashMap<String, Bytes>,
    verified: bool,
    direct_rooms: HashMap<UserId, RoomId>,
    created_direct_rooms: Vec<(UserId, Option<String>)>,
    directory: Vec<UserProfile>,
    recent: Vec<UserProfile>,
    search_queries: Vec<String>,
    search_gates: HashMap<String, mpsc::Receiver<()>>,
    syncing: bool,
    stop_sync_calls: usize,
    opened_feeds: Vec<FeedConfig>,
    next_room: u64,
}

impl SimState {
    /// Count a call and apply any scripted failure.
    fn enter(&mut self, op: SimOp) -> Result<(), SdkError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failures.contains(&op) {
            return Err(SdkError::Network(format!("scripted failure: {op:?}")));
        }
        Ok(())
    }
}

/// Simulated SDK client. Clones share state.
#[derive(Clone)]
pub struct SimSdk {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSdk {
    /// Session for `@me:sim` with an empty feed.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let user_id = UserId::new("@me:sim").expect("static id is not empty");
        Self {
            state: Arc::new(Mutex::new(SimState {
                user_id,
                entries: Vec::new(),
                rooms: HashMap::new(),
                unavailable: HashSet::new(),
                listeners: BTreeMap::new(),
                next_listener: 0,
                failures: HashSet::new(),
                calls: HashMap::new(),
                display_name: "Me".to_owned(),
                avatar_url: "mxc://sim/me".to_owned(),
                media: HashMap::new(),
                verified: false,
                direct_rooms: HashMap::new(),
                created_direct_rooms: Vec::new(),
                directory: Vec::new(),
                recent: Vec::new(),
                search_queries: Vec::new(),
                search_gates: HashMap::new(),
                syncing: false,
                stop_sync_calls: 0,
                opened_feeds: Vec::new(),
                next_room: 0,
            })),
        }
    }

    /// Session with `count` generated rooms, deterministic for `seed`.
    ///
    /// Roughly one slot in eight is left empty.
    pub fn seeded(seed: u64, count: usize) -> Self {
        let sdk = Self::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        {
            let mut state = sdk.lock();
            for _ in 0..count {
                if rng.gen_ratio(1, 8) {
                    state.entries.push(RoomListEntry::Empty);
                }
                let room = generated_room(&mut state, &mut rng);
                state.entries.push(RoomListEntry::Filled(room.id.clone()));
                state.rooms.insert(room.id.clone(), room);
            }
        }
        sdk
    }

    /// Lock the shared state.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned. Acceptable for simulation code.
    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().expect("Mutex poisoned")
    }

    /// Make every future call of `op` fail.
    pub fn fail(&self, op: SimOp) {
        self.lock().failures.insert(op);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: SimOp) {
        self.lock().failures.remove(&op);
    }

    /// Number of times `op` was called.
    pub fn calls(&self, op: SimOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Set the authenticated user.
    pub fn set_user_id(&self, user_id: UserId) {
        self.lock().user_id = user_id;
    }

    /// Set own display name.
    pub fn set_display_name(&self, name: impl Into<String>) {
        self.lock().display_name = name.into();
    }

    /// Store media bytes for a URL.
    pub fn put_media(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        self.lock().media.insert(url.into(), bytes.into());
    }

    /// Mark the session as already verified.
    pub fn set_verified(&self, verified: bool) {
        self.lock().verified = verified;
    }

    /// Check if the session is verified.
    pub fn is_verified(&self) -> bool {
        self.lock().verified
    }

    /// Insert or replace room state without touching the feed.
    pub fn upsert_room(&self, room: SimRoom) {
        self.lock().rooms.insert(room.id.clone(), room);
    }

    /// Room state by id.
    pub fn room(&self, id: &RoomId) -> Option<SimRoom> {
        self.lock().rooms.get(id).cloned()
    }

    /// Make room lookups for `id` fail (or succeed again) without a feed
    /// notification.
    pub fn set_room_available(&self, id: &RoomId, available: bool) {
        let mut state = self.lock();
        if available {
            state.unavailable.remove(id);
        } else {
            state.unavailable.insert(id.clone());
        }
    }

    /// Check if `id` resolves through `get_room`.
    pub fn is_resolvable(&self, id: &RoomId) -> bool {
        let state = self.lock();
        state.rooms.contains_key(id) && !state.unavailable.contains(id)
    }

    /// Current feed entries.
    pub fn entries(&self) -> Vec<RoomListEntry> {
        self.lock().entries.clone()
    }

    /// Replace the feed entries and notify listeners.
    pub fn set_entries(&self, entries: Vec<RoomListEntry>) {
        self.lock().entries = entries;
        self.notify();
    }

    /// Append a room to the feed and notify listeners.
    pub fn push_room(&self, room: SimRoom) {
        {
            let mut state = self.lock();
            state.entries.push(RoomListEntry::Filled(room.id.clone()));
            state.rooms.insert(room.id.clone(), room);
        }
        self.notify();
    }

    /// Add a freshly generated room at `index` (clamped) and notify.
    pub fn insert_generated_room(&self, index: usize, rng: &mut impl Rng) -> RoomId {
        let id = {
            let mut state = self.lock();
            let room = generated_room(&mut state, rng);
            let id = room.id.clone();
            let index = index.min(state.entries.len());
            state.entries.insert(index, RoomListEntry::Filled(id.clone()));
            state.rooms.insert(id.clone(), room);
            id
        };
        self.notify();
        id
    }

    /// Insert an entry at `index` (clamped) and notify.
    pub fn insert_entry(&self, index: usize, entry: RoomListEntry) {
        {
            let mut state = self.lock();
            let index = index.min(state.entries.len());
            state.entries.insert(index, entry);
        }
        self.notify();
    }

    /// Remove the entry at `index` and notify. Out-of-range indices are
    /// ignored.
    pub fn remove_entry(&self, index: usize) -> Option<RoomListEntry> {
        let removed = {
            let mut state = self.lock();
            (index < state.entries.len()).then(|| state.entries.remove(index))
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Move the entry at `from` to `to` (clamped) and notify.
    pub fn move_entry(&self, from: usize, to: usize) {
        {
            let mut state = self.lock();
            if from >= state.entries.len() {
                return;
            }
            let entry = state.entries.remove(from);
            let to = to.min(state.entries.len());
            state.entries.insert(to, entry);
        }
        self.notify();
    }

    /// Mark the slot holding `id` stale and notify. Returns `false` if no
    /// slot holds `id`.
    pub fn invalidate(&self, id: &RoomId) -> bool {
        let found = {
            let mut state = self.lock();
            let slot = state.entries.iter_mut().find(|e| e.room_id() == Some(id));
            match slot {
                Some(entry) => {
                    *entry = RoomListEntry::Invalidated(id.clone());
                    true
                },
                None => false,
            }
        };
        if found {
            self.notify();
        }
        found
    }

    /// Fire every registered feed listener.
    pub fn notify(&self) {
        let listeners: Vec<SharedListener> = self.lock().listeners.values().cloned().collect();
        tracing::trace!(listeners = listeners.len(), "sim feed notify");
        for listener in listeners {
            listener();
        }
    }

    /// Number of registered feed listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Check if background sync is running.
    pub fn is_syncing(&self) -> bool {
        self.lock().syncing
    }

    /// Number of `stop_sync` calls.
    pub fn stop_sync_calls(&self) -> usize {
        self.lock().stop_sync_calls
    }

    /// Feed configurations passed to `open_feed`.
    pub fn opened_feeds(&self) -> Vec<FeedConfig> {
        self.lock().opened_feeds.clone()
    }

    /// Register an existing direct room with `user_id`.
    pub fn add_direct_room(&self, user_id: UserId, room_id: RoomId) {
        self.lock().direct_rooms.insert(user_id, room_id);
    }

    /// Direct rooms created through `create_direct_room`, with the suggested
    /// names.
    pub fn created_direct_rooms(&self) -> Vec<(UserId, Option<String>)> {
        self.lock().created_direct_rooms.clone()
    }

    /// Add a profile to the user directory.
    pub fn add_directory_user(&self, profile: UserProfile) {
        self.lock().directory.push(profile);
    }

    /// Set the recent conversation counterparts.
    pub fn set_recent(&self, profiles: Vec<UserProfile>) {
        self.lock().recent = profiles;
    }

    /// Queries received by `search_profiles`, in call order.
    pub fn search_queries(&self) -> Vec<String> {
        self.lock().search_queries.clone()
    }

    /// Hold the response to the next search for `query`.
    pub fn hold_search(&self, query: impl Into<String>) -> SearchGate {
        let (release, gate) = mpsc::channel();
        self.lock().search_gates.insert(query.into(), gate);
        SearchGate { release }
    }
}

fn generated_room(state: &mut SimState, rng: &mut impl Rng) -> SimRoom {
    const NAMES: [&str; 8] =
        ["Alice", "Bob", "Carol", "Design", "Climbing", "Ops", "Family", "Release"];

    let n = state.next_room;
    state.next_room += 1;
    let id = sim_room_id(n);

    let mut room = SimRoom::new(id).with_unread(rng.gen_range(0..5));
    if rng.gen_ratio(7, 8) {
        let name = NAMES[rng.gen_range(0..NAMES.len())];
        room = room.named(format!("{name} {n}"));
    }
    if rng.gen_bool(0.5) {
        room = room.with_message(SimMessage::text(format!("message {n}")));
    }
    if rng.gen_ratio(1, 4) {
        room = room.direct();
    }
    room
}

/// Id of the `n`th generated room.
#[allow(clippy::expect_used)]
pub fn sim_room_id(n: u64) -> RoomId {
    RoomId::new(format!("!room{n}:sim")).expect("generated id is not empty")
}

/// Feed handle backed by the simulated state.
pub struct SimFeed {
    state: Arc<Mutex<SimState>>,
}

impl SimFeed {
    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().expect("Mutex poisoned")
    }
}

impl SyncFeed for SimFeed {
    fn current_snapshot(&self) -> Vec<RoomListEntry> {
        self.lock().entries.clone()
    }

    fn on_update(&self, listener: UpdateListener) -> ListenerId {
        let mut state = self.lock();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.insert(id, Arc::from(listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }
}

/// Verification controller backed by the simulated state.
pub struct SimVerification {
    state: Arc<Mutex<SimState>>,
}

impl SimVerification {
    #[allow(clippy::expect_used)]
    fn step(&self, verifies: bool) -> Result<(), SdkError> {
        let mut state = self.state.lock().expect("Mutex poisoned");
        state.enter(SimOp::VerificationStep)?;
        if verifies {
            state.verified = true;
        }
        Ok(())
    }
}

impl VerificationController for SimVerification {
    #[allow(clippy::expect_used)]
    fn is_verified(&self) -> bool {
        self.state.lock().expect("Mutex poisoned").verified
    }

    fn request_verification(&self) -> Result<(), SdkError> {
        self.step(false)
    }

    fn approve_verification(&self) -> Result<(), SdkError> {
        self.step(true)
    }

    fn decline_verification(&self) -> Result<(), SdkError> {
        self.step(false)
    }

    fn cancel_verification(&self) -> Result<(), SdkError> {
        self.step(false)
    }
}

impl SessionSdk for SimSdk {
    type Feed = SimFeed;
    type Room = SimRoom;
    type RoomDetail = SimRoom;
    type Verification = SimVerification;

    fn user_id(&self) -> Result<UserId, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::UserId)?;
        Ok(state.user_id.clone())
    }

    fn open_feed(&self, config: &FeedConfig) -> Result<SimFeed, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::OpenFeed)?;
        state.opened_feeds.push(config.clone());
        Ok(SimFeed { state: Arc::clone(&self.state) })
    }

    fn start_sync(&self) -> Result<(), SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::StartSync)?;
        state.syncing = true;
        Ok(())
    }

    fn stop_sync(&self) {
        let mut state = self.lock();
        state.syncing = false;
        state.stop_sync_calls += 1;
    }

    fn get_room(&self, room_id: &RoomId) -> Result<SimRoom, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::GetRoom)?;
        if state.unavailable.contains(room_id) {
            return Err(SdkError::NotFound);
        }
        state.rooms.get(room_id).cloned().ok_or(SdkError::NotFound)
    }

    fn get_room_detail(&self, room_id: &RoomId) -> Result<SimRoom, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::GetRoomDetail)?;
        state.rooms.get(room_id).cloned().ok_or(SdkError::NotFound)
    }

    fn display_name(&self) -> Result<String, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::DisplayName)?;
        Ok(state.display_name.clone())
    }

    fn avatar_url(&self) -> Result<String, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::AvatarUrl)?;
        Ok(state.avatar_url.clone())
    }

    fn fetch_media(&self, source: &MediaSource) -> Result<Bytes, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::FetchMedia)?;
        state.media.get(source.url()).cloned().ok_or(SdkError::NotFound)
    }

    fn verification_controller(&self) -> Result<SimVerification, SdkError> {
        self.lock().enter(SimOp::VerificationController)?;
        Ok(SimVerification { state: Arc::clone(&self.state) })
    }

    fn direct_room_for_user(&self, user_id: &UserId) -> Result<Option<RoomId>, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::DirectRoomLookup)?;
        Ok(state.direct_rooms.get(user_id).cloned())
    }

    fn create_direct_room(
        &self,
        user_id: &UserId,
        suggested_name: Option<&str>,
    ) -> Result<RoomId, SdkError> {
        let mut state = self.lock();
        state.enter(SimOp::CreateDirectRoom)?;

        let n = state.next_room;
        state.next_room += 1;
        let id = sim_room_id(n);

        let mut room = SimRoom::new(id.clone()).direct();
        room.name = suggested_name.map(str::to_owned);
        state.rooms.insert(id.clone(), room);
        state.direct_rooms.insert(user_id.clone(), id.clone());
        state.created_direct_rooms.push((user_id.clone(), suggested_name.map(str::to_owned)));
        Ok(id)
    }

    fn search_profiles(&self, query: &str) -> Result<Vec<UserProfile>, SdkError> {
        let gate = {
            let mut state = self.lock();
            state.search_queries.push(query.to_owned());
            state.enter(SimOp::SearchProfiles)?;
            state.search_gates.remove(query)
        };

        // Blocks this worker until the test releases or drops the gate.
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        let needle = query.to_lowercase();
        let state = self.lock();
        Ok(state
            .directory
            .iter()
            .filter(|profile| {
                profile.user_id.as_str().to_lowercase().contains(&needle)
                    || profile
                        .display_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    fn recent_conversation_counterparts(&self) -> Vec<UserProfile> {
        self.lock().recent.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn seeded_is_deterministic() {
        let a = SimSdk::seeded(7, 12);
        let b = SimSdk::seeded(7, 12);

        assert_eq!(a.entries(), b.entries());
        for id in a.entries().iter().filter_map(RoomListEntry::room_id) {
            assert_eq!(a.room(id), b.room(id));
        }
    }

    #[test]
    fn notify_reaches_registered_listeners_only() {
        let sdk = SimSdk::new();
        let feed = sdk.open_feed(&FeedConfig::default()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let id = feed.on_update(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        sdk.notify();
        feed.remove_listener(id);
        sdk.notify();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(sdk.listener_count(), 0);
    }

    #[test]
    fn scripted_failure_is_counted() {
        let sdk = SimSdk::new();
        sdk.fail(SimOp::DisplayName);

        assert!(sdk.display_name().is_err());
        assert_eq!(sdk.calls(SimOp::DisplayName), 1);

        sdk.recover(SimOp::DisplayName);
        assert_eq!(sdk.display_name().unwrap(), "Me");
    }

    #[test]
    fn unavailable_room_does_not_resolve() {
        let sdk = SimSdk::new();
        let room = SimRoom::new(sim_room_id(1)).named("Alice");
        sdk.push_room(room.clone());

        sdk.set_room_available(&room.id, false);
        assert_eq!(sdk.get_room(&room.id), Err(SdkError::NotFound));

        sdk.set_room_available(&room.id, true);
        assert_eq!(sdk.get_room(&room.id).unwrap(), room);
    }

    #[test]
    fn invalidate_marks_existing_slot() {
        let sdk = SimSdk::new();
        let id = sim_room_id(3);
        sdk.push_room(SimRoom::new(id.clone()));

        assert!(sdk.invalidate(&id));
        assert_eq!(sdk.entries(), vec![RoomListEntry::Invalidated(id)]);
        assert!(!sdk.invalidate(&sim_room_id(4)));
    }
}
