//! Simulated session run end to end.
//!
//! A seeded [`SimSdk`] stands in for the remote service. The demo starts a
//! session, runs the coordinator and the home runtime on the tokio runtime,
//! then mutates the feed step by step. After every step it waits for the
//! coordinator to catch up and checks the published list against the
//! standard invariants.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomsync_app::{Bridge, HomeScreen, Presenter, Runtime, StartChatScreen};
use roomsync_client::{RoomListCoordinator, SessionClient, SyncState};
use roomsync_core::{RoomId, RoomListEntry, SessionConfig, UserId, UserProfile};
use roomsync_harness::{InvariantRegistry, SimSdk, SystemSnapshot};
use tokio::sync::watch;

use crate::DemoError;

/// How long to wait for the coordinator after a mutation.
const CATCH_UP_TIMEOUT: Duration = Duration::from_secs(5);

/// Users in the simulated directory. The first two are recent contacts.
const DIRECTORY: [(&str, &str); 5] = [
    ("@alice:sim", "Alice"),
    ("@bob:sim", "Bob"),
    ("@alicia:sim", "Alicia"),
    ("@carol:sim", "Carol"),
    ("@dave:sim", "Dave"),
];

/// Demo parameters.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Session configuration handed to the client.
    pub session: SessionConfig,
    /// Rooms generated before the session starts.
    pub rooms: usize,
    /// Seed for generated rooms and mutations.
    pub seed: u64,
    /// Feed mutations to apply.
    pub steps: usize,
    /// Pause between mutations.
    pub step_interval: Duration,
    /// Directory search to run once the mutations are done.
    pub search: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            rooms: 20,
            seed: 0,
            steps: 50,
            step_interval: Duration::from_millis(10),
            search: None,
        }
    }
}

/// Outcome of a demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Rooms published after the last mutation.
    pub rooms: usize,
    /// Notifications processed by the coordinator.
    pub notifications: u64,
    /// Home screen renders.
    pub renders: usize,
    /// Users found by the directory search, if one ran.
    pub search_results: Option<usize>,
}

/// Run the demo to completion.
///
/// The session is always shut down before returning, also on failure.
pub async fn run(config: DemoConfig) -> Result<DemoReport, DemoError> {
    let sdk = SimSdk::seeded(config.seed, config.rooms);
    let directory: Vec<UserProfile> = DIRECTORY
        .iter()
        .filter_map(|(id, name)| {
            UserId::new(*id).ok().map(|user_id| UserProfile::new(user_id).with_display_name(*name))
        })
        .collect();
    for profile in &directory {
        sdk.add_directory_user(profile.clone());
    }
    sdk.set_recent(directory.iter().take(2).cloned().collect());

    let client = SessionClient::start(sdk.clone(), config.session.clone())?;
    tracing::info!(
        user_id = %client.current_user_id(),
        rooms = config.rooms,
        seed = config.seed,
        "demo session started"
    );

    let coordinator = RoomListCoordinator::new(&client);
    let mut states = coordinator.subscribe();
    let renders = Arc::new(AtomicUsize::new(0));
    let presenter = LogPresenter { renders: Arc::clone(&renders) };
    let runtime = Runtime::new(Bridge::new(client.clone()), coordinator.subscribe(), presenter);

    let sync = tokio::spawn(coordinator.run());
    let home = tokio::spawn(runtime.run());

    let progress = exercise(&sdk, &client, &mut states, &config).await;

    client.shutdown();
    sync.await?;
    let home = home.await?;
    tracing::info!(user = home.user_display_name(), "demo session stopped");

    let progress = progress?;
    Ok(DemoReport {
        rooms: progress.rooms,
        notifications: progress.notifications,
        renders: renders.load(Ordering::Relaxed),
        search_results: progress.search_results,
    })
}

struct Progress {
    rooms: usize,
    notifications: u64,
    search_results: Option<usize>,
}

async fn exercise(
    sdk: &SimSdk,
    client: &SessionClient<SimSdk>,
    states: &mut watch::Receiver<Arc<SyncState>>,
    config: &DemoConfig,
) -> Result<Progress, DemoError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
    let invariants = InvariantRegistry::standard();
    let mut expected = states.borrow().notifications;
    let mut state = Arc::clone(&states.borrow());

    for step in 0..config.steps {
        if mutate(sdk, &mut rng) {
            expected += 1;
        }
        state = catch_up(states, expected).await?;

        if let Err(violations) = invariants.check_all(&SystemSnapshot::capture(sdk, &state)) {
            let details: Vec<_> = violations.iter().map(ToString::to_string).collect();
            return Err(DemoError::InvariantViolated { step, details: details.join("\n") });
        }
        tracing::debug!(step, rooms = state.rooms.len(), "feed mutation applied");

        if !config.step_interval.is_zero() {
            tokio::time::sleep(config.step_interval).await;
        }
    }

    let search_results = match &config.search {
        Some(query) => Some(search(client, query).await),
        None => None,
    };

    Ok(Progress { rooms: state.rooms.len(), notifications: state.notifications, search_results })
}

/// Wait until the coordinator has processed `expected` notifications.
async fn catch_up(
    states: &mut watch::Receiver<Arc<SyncState>>,
    expected: u64,
) -> Result<Arc<SyncState>, DemoError> {
    let caught_up = {
        let waited = tokio::time::timeout(
            CATCH_UP_TIMEOUT,
            states.wait_for(|state| state.notifications >= expected),
        )
        .await;
        match waited {
            Ok(Ok(state)) => Some(Arc::clone(&state)),
            _ => None,
        }
    };

    caught_up.ok_or_else(|| DemoError::Stalled {
        processed: states.borrow().notifications,
        expected,
        waited: CATCH_UP_TIMEOUT,
    })
}

/// Apply one random feed mutation. Returns `false` if nothing changed.
fn mutate(sdk: &SimSdk, rng: &mut impl Rng) -> bool {
    let entries = sdk.entries();
    let len = entries.len();
    if len == 0 {
        sdk.insert_generated_room(0, rng);
        return true;
    }

    match rng.gen_range(0..5) {
        0 => {
            let index = rng.gen_range(0..=len);
            sdk.insert_generated_room(index, rng);
            true
        },
        1 => sdk.remove_entry(rng.gen_range(0..len)).is_some(),
        2 => {
            let (from, to) = (rng.gen_range(0..len), rng.gen_range(0..len));
            sdk.move_entry(from, to);
            true
        },
        3 => {
            let filled: Vec<RoomId> =
                entries.iter().filter_map(RoomListEntry::room_id).cloned().collect();
            if filled.is_empty() {
                return false;
            }
            let room_id = &filled[rng.gen_range(0..filled.len())];
            sdk.set_room_available(room_id, rng.gen_bool(0.5));
            sdk.invalidate(room_id)
        },
        _ => {
            sdk.insert_entry(rng.gen_range(0..=len), RoomListEntry::Empty);
            true
        },
    }
}

/// Run a directory search through the start-chat screen.
async fn search(client: &SessionClient<SimSdk>, query: &str) -> usize {
    let mut bridge = Bridge::new(client.clone());
    let mut screen = StartChatScreen::new();

    for event in bridge.load_suggestions().await {
        screen.handle(event);
    }
    for action in screen.search(query) {
        for event in bridge.process_start_chat_action(action).await {
            screen.handle(event);
        }
    }
    for event in bridge.settle_search().await {
        screen.handle(event);
    }

    if let Some(alert) = screen.alert() {
        tracing::warn!(query, alert = alert.message(), "directory search failed");
    }
    let section = screen.section();
    for user in &section.users {
        tracing::info!(user_id = %user.user_id, name = ?user.display_name, kind = ?section.kind, "user");
    }
    section.users.len()
}

/// Presenter logging every render.
struct LogPresenter {
    renders: Arc<AtomicUsize>,
}

impl Presenter for LogPresenter {
    fn present(&mut self, home: &HomeScreen) {
        self.renders.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            user = home.user_display_name(),
            rooms = home.rooms().len(),
            verification_banner = home.shows_verification_banner(),
            "home rendered"
        );
        for room in home.rooms() {
            tracing::trace!(
                room_id = %room.id,
                name = ?room.display_name,
                unread = room.unread_count,
                "room"
            );
        }
    }
}
