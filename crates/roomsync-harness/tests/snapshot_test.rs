//! Snapshot tests for captured system state.

use roomsync_client::{RoomListCoordinator, SessionClient};
use roomsync_core::{RoomListEntry, SessionConfig};
use roomsync_harness::{InvariantRegistry, SimMessage, SimRoom, SimSdk, SystemSnapshot, sim_room_id};

#[test]
fn published_list_after_mixed_feed() {
    let sdk = SimSdk::new();
    sdk.upsert_room(
        SimRoom::new(sim_room_id(1))
            .named("Alice")
            .with_unread(2)
            .with_message(SimMessage::text("see you"))
            .direct(),
    );
    sdk.upsert_room(SimRoom::new(sim_room_id(2)).named("Design").encrypted());
    sdk.upsert_room(SimRoom::new(sim_room_id(3)).with_message(SimMessage::non_text()));
    sdk.set_room_available(&sim_room_id(2), false);
    sdk.set_entries(vec![
        RoomListEntry::Filled(sim_room_id(1)),
        RoomListEntry::Empty,
        RoomListEntry::Invalidated(sim_room_id(2)),
        RoomListEntry::Filled(sim_room_id(3)),
    ]);

    let client = SessionClient::start(sdk.clone(), SessionConfig::default()).unwrap();
    let coordinator = RoomListCoordinator::new(&client);
    let snapshot = SystemSnapshot::capture(&sdk, &coordinator.state());

    InvariantRegistry::standard().assert_all(&snapshot, "after initial pass");
    insta::assert_json_snapshot!(snapshot.published, @r###"
    [
      {
        "id": "!room1:sim",
        "display_name": "Alice",
        "last_message_preview": "see you",
        "is_direct": true,
        "is_encrypted": false,
        "unread_count": 2
      },
      {
        "id": "!room3:sim",
        "display_name": null,
        "last_message_preview": "",
        "is_direct": false,
        "is_encrypted": false,
        "unread_count": 0
      }
    ]
    "###);
}
