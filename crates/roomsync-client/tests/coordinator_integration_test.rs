//! Integration tests for the room-list coordinator over the simulated SDK.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - Published order equals the feed's order
//! - Empty and unresolvable slots are elided
//! - Session callbacks accompany every pass

use std::time::Duration;

use roomsync_client::{
    RoomListCoordinator, RoomSummaryResolver, SessionCallback, SessionClient, SyncState,
};
use roomsync_core::{RoomListEntry, SessionConfig};
use roomsync_harness::{
    InvariantRegistry, SimMessage, SimOp, SimRoom, SimSdk, SystemSnapshot, sim_room_id,
};

fn started(sdk: &SimSdk) -> (SessionClient<SimSdk>, RoomListCoordinator<SimSdk>) {
    let client = SessionClient::start(sdk.clone(), SessionConfig::default()).unwrap();
    let coordinator = RoomListCoordinator::new(&client);
    (client, coordinator)
}

fn assert_invariants(sdk: &SimSdk, state: &SyncState, context: &str) {
    let snapshot = SystemSnapshot::capture(sdk, state);
    InvariantRegistry::standard().assert_all(&snapshot, context);
}

#[test]
fn failed_resolution_is_omitted_and_empty_slot_skipped() {
    let sdk = SimSdk::new();
    let (_client, mut coordinator) = started(&sdk);

    sdk.upsert_room(SimRoom::new(sim_room_id(1)).named("Alice").with_unread(2));
    sdk.set_entries(vec![
        RoomListEntry::Filled(sim_room_id(1)),
        RoomListEntry::Empty,
        RoomListEntry::Filled(sim_room_id(2)),
    ]);
    coordinator.process_pending();

    let state = coordinator.state();
    assert_eq!(state.rooms.len(), 1);
    assert_eq!(state.rooms[0].id, sim_room_id(1));
    assert_eq!(state.rooms[0].display_name.as_deref(), Some("Alice"));
    assert_eq!(state.rooms[0].unread_count, 2);
    assert_invariants(&sdk, &state, "after mixed feed");
}

#[test]
fn initial_pass_publishes_existing_feed() {
    let sdk = SimSdk::seeded(42, 10);
    let (_client, coordinator) = started(&sdk);

    let state = coordinator.state();
    assert_eq!(state.rooms.len(), 10);
    assert_eq!(state.notifications, 0);
    assert_invariants(&sdk, &state, "after initial pass");
}

#[test]
fn repeated_notification_yields_identical_rooms() {
    let sdk = SimSdk::seeded(7, 6);
    let (_client, mut coordinator) = started(&sdk);

    sdk.notify();
    coordinator.process_pending();
    let first = coordinator.state();

    sdk.notify();
    coordinator.process_pending();
    let second = coordinator.state();

    assert_eq!(first.rooms, second.rooms);
    assert_eq!(second.notifications, first.notifications + 1);
}

#[test]
fn invalidated_room_that_no_longer_resolves_is_removed() {
    let sdk = SimSdk::new();
    let (_client, mut coordinator) = started(&sdk);

    sdk.push_room(SimRoom::new(sim_room_id(1)).named("Alice"));
    sdk.push_room(SimRoom::new(sim_room_id(2)).named("Bob"));
    coordinator.process_pending();
    assert_eq!(coordinator.state().rooms.len(), 2);

    sdk.set_room_available(&sim_room_id(2), false);
    sdk.invalidate(&sim_room_id(2));
    coordinator.process_pending();

    let state = coordinator.state();
    assert_eq!(state.room_ids(), vec![sim_room_id(1)]);
    assert_invariants(&sdk, &state, "after invalidation");
}

#[test]
fn pass_reflects_feed_at_pass_time() {
    let sdk = SimSdk::new();
    let (_client, mut coordinator) = started(&sdk);

    sdk.push_room(SimRoom::new(sim_room_id(1)).named("first"));
    sdk.push_room(SimRoom::new(sim_room_id(2)).named("second"));
    sdk.move_entry(1, 0);

    // Three queued notifications, every pass sees the final feed.
    assert_eq!(coordinator.process_pending(), 3);
    let state = coordinator.state();
    assert_eq!(state.room_ids(), vec![sim_room_id(2), sim_room_id(1)]);
    assert_eq!(state.notifications, 3);
}

#[test]
fn resync_picks_up_silent_changes_without_counting() {
    let sdk = SimSdk::new();
    let (_client, mut coordinator) = started(&sdk);

    sdk.push_room(SimRoom::new(sim_room_id(1)).named("old"));
    coordinator.process_pending();

    sdk.upsert_room(SimRoom::new(sim_room_id(1)).named("new").with_message(SimMessage::text("hi")));
    assert_eq!(coordinator.process_pending(), 0);
    assert_eq!(coordinator.state().rooms[0].display_name.as_deref(), Some("old"));

    coordinator.resync();
    let state = coordinator.state();
    assert_eq!(state.rooms[0].display_name.as_deref(), Some("new"));
    assert_eq!(state.rooms[0].last_message_preview.as_deref(), Some("hi"));
    assert_eq!(state.notifications, 1);
}

#[test]
fn lookup_failure_drops_every_room_but_pass_succeeds() {
    let sdk = SimSdk::seeded(3, 4);
    let (_client, mut coordinator) = started(&sdk);
    assert_eq!(coordinator.state().rooms.len(), 4);

    sdk.fail(SimOp::GetRoom);
    sdk.notify();
    coordinator.process_pending();
    assert!(coordinator.state().rooms.is_empty());

    sdk.recover(SimOp::GetRoom);
    sdk.notify();
    coordinator.process_pending();
    assert_eq!(coordinator.state().rooms.len(), 4);
}

#[test]
fn callbacks_report_sync_updates_and_list_updates() {
    let sdk = SimSdk::new();
    let (client, mut coordinator) = started(&sdk);
    let mut callbacks = client.callbacks();

    sdk.push_room(SimRoom::new(sim_room_id(1)));
    coordinator.process_pending();

    assert_eq!(callbacks.try_recv().unwrap(), SessionCallback::ReceivedSyncUpdate);
    assert_eq!(callbacks.try_recv().unwrap(), SessionCallback::UpdatedRoomsList);
    assert!(callbacks.try_recv().is_err());
}

#[test]
fn watch_subscribers_see_latest_state() {
    let sdk = SimSdk::new();
    let (_client, mut coordinator) = started(&sdk);
    let mut states = coordinator.subscribe();

    sdk.push_room(SimRoom::new(sim_room_id(1)));
    coordinator.process_pending();

    assert!(states.has_changed().unwrap());
    assert_eq!(states.borrow_and_update().room_ids(), vec![sim_room_id(1)]);
}

#[tokio::test]
async fn run_delivers_until_shutdown() {
    let sdk = SimSdk::new();
    let (client, coordinator) = started(&sdk);
    let mut states = coordinator.subscribe();
    let task = tokio::spawn(coordinator.run());

    sdk.push_room(SimRoom::new(sim_room_id(1)).named("Alice"));
    tokio::time::timeout(Duration::from_secs(5), states.wait_for(|s| s.rooms.len() == 1))
        .await
        .unwrap()
        .unwrap();

    client.shutdown();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();

    assert!(states.borrow().rooms.is_empty());
    assert_eq!(sdk.listener_count(), 0);
}

#[tokio::test]
async fn dropping_last_client_stops_run() {
    let sdk = SimSdk::seeded(11, 3);
    let (client, coordinator) = started(&sdk);
    let states = coordinator.subscribe();
    let task = tokio::spawn(coordinator.run());

    drop(client);
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();

    // Oracle: the coordinator did not keep the session alive
    assert_eq!(sdk.stop_sync_calls(), 1);
    assert_eq!(sdk.listener_count(), 0);
    assert!(!sdk.is_syncing());
    assert!(states.borrow().rooms.is_empty());
}

#[test]
fn idle_coordinator_does_not_keep_session_alive() {
    let sdk = SimSdk::seeded(4, 2);
    let (client, mut coordinator) = started(&sdk);
    assert_eq!(coordinator.state().rooms.len(), 2);

    drop(client);
    assert_eq!(sdk.stop_sync_calls(), 1);

    // Passes after teardown leave the last published state alone.
    coordinator.resync();
    assert_eq!(coordinator.process_pending(), 0);
    assert_eq!(coordinator.state().rooms.len(), 2);
}

#[test]
fn resolver_never_serves_a_stale_summary() {
    let sdk = SimSdk::new();
    let client = SessionClient::start(sdk.clone(), SessionConfig::default()).unwrap();
    let resolver = RoomSummaryResolver::new(&client);
    sdk.push_room(SimRoom::new(sim_room_id(1)).named("Alice"));

    let summary = resolver.resolve(&sim_room_id(1)).unwrap();
    assert_eq!(summary.display_name.as_deref(), Some("Alice"));

    sdk.set_room_available(&sim_room_id(1), false);
    sdk.invalidate(&sim_room_id(1));
    assert_eq!(resolver.resolve(&sim_room_id(1)), None);

    sdk.upsert_room(SimRoom::new(sim_room_id(1)).named("Alice B."));
    sdk.set_room_available(&sim_room_id(1), true);
    let summary = resolver.resolve(&sim_room_id(1)).unwrap();
    assert_eq!(summary.display_name.as_deref(), Some("Alice B."));
}

#[test]
fn resolver_resolves_nothing_once_session_is_gone() {
    let sdk = SimSdk::new();
    sdk.push_room(SimRoom::new(sim_room_id(1)));
    let client = SessionClient::start(sdk.clone(), SessionConfig::default()).unwrap();
    let resolver = RoomSummaryResolver::new(&client);
    assert!(resolver.resolve(&sim_room_id(1)).is_some());

    drop(client);

    assert_eq!(resolver.resolve(&sim_room_id(1)), None);
    assert_eq!(sdk.stop_sync_calls(), 1);
}
