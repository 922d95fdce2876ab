//! Property-based tests for the screen state machines.
//!
//! Tests verify that screen invariants hold under arbitrary event sequences.

use roomsync_app::{HomeAction, HomeEvent, HomeScreen, StartChatEvent, StartChatScreen};
use roomsync_client::{UsersSection, UsersSectionKind, VerificationState};
use roomsync_core::{RoomId, RoomSummary, UserId, UserProfile};
use proptest::prelude::*;

fn room_strategy() -> impl Strategy<Value = RoomSummary> {
    (0u32..50, proptest::option::of("[a-zA-Z ]{0,8}")).prop_map(|(n, name)| {
        let summary = RoomSummary::new(RoomId::new(format!("!r{n}:x")).unwrap());
        match name {
            Some(name) => summary.with_display_name(name),
            None => summary,
        }
    })
}

fn verification_strategy() -> impl Strategy<Value = VerificationState> {
    prop_oneof![
        Just(VerificationState::Initial),
        Just(VerificationState::Requested),
        Just(VerificationState::Verified),
        Just(VerificationState::Cancelled),
        Just(VerificationState::Failed),
    ]
}

/// Generate random home events.
fn home_event_strategy() -> impl Strategy<Value = HomeEvent> {
    prop_oneof![
        3 => prop::collection::vec(room_strategy(), 0..8).prop_map(HomeEvent::RoomsUpdated),
        1 => "[a-zA-Z]{0,8}".prop_map(HomeEvent::DisplayNameLoaded),
        1 => Just(HomeEvent::DisplayNameUnavailable),
        1 => "mxc://[a-z]{1,5}".prop_map(HomeEvent::AvatarLoaded),
        1 => Just(HomeEvent::AvatarUnavailable),
        2 => verification_strategy().prop_map(HomeEvent::VerificationChanged),
        2 => "[a-zA-Z]{0,3}".prop_map(HomeEvent::SearchQueryChanged),
        1 => "[a-z ]{1,10}".prop_map(|message| HomeEvent::Error { message }),
    ]
}

fn user_strategy() -> impl Strategy<Value = UserProfile> {
    (0u32..20).prop_map(|n| UserProfile::new(UserId::new(format!("@u{n}:x")).unwrap()))
}

/// Generate random start-chat events.
fn start_chat_event_strategy() -> impl Strategy<Value = StartChatEvent> {
    prop_oneof![
        2 => (any::<bool>(), prop::collection::vec(user_strategy(), 0..5)).prop_map(
            |(results, users)| {
                let kind = if results {
                    UsersSectionKind::SearchResults
                } else {
                    UsersSectionKind::Suggestions
                };
                StartChatEvent::SectionUpdated(UsersSection { kind, users })
            }
        ),
        1 => (0u32..20)
            .prop_map(|n| StartChatEvent::ExistingDirectChat(RoomId::new(format!("!d{n}:x")).unwrap())),
        1 => user_strategy().prop_map(StartChatEvent::InviteNeeded),
        1 => (0u32..20)
            .prop_map(|n| StartChatEvent::DirectChatCreated(RoomId::new(format!("!d{n}:x")).unwrap())),
        1 => Just(StartChatEvent::StartChatFailed),
        1 => Just(StartChatEvent::SearchFailed),
    ]
}

proptest! {
    #[test]
    fn prop_home_invariants_hold(events in prop::collection::vec(home_event_strategy(), 0..50)) {
        let mut home = HomeScreen::new(UserId::new("@me:x").unwrap());
        let mut last_verification = None;
        let mut last_rooms = Vec::new();
        let mut last_name = None;

        for event in events {
            match &event {
                HomeEvent::VerificationChanged(state) => last_verification = Some(*state),
                HomeEvent::RoomsUpdated(rooms) => last_rooms = rooms.clone(),
                HomeEvent::DisplayNameLoaded(name) => last_name = Some(name.clone()),
                HomeEvent::DisplayNameUnavailable => last_name = None,
                _ => {},
            }

            // Every event re-renders
            prop_assert_eq!(home.handle(event), vec![HomeAction::Render]);

            // Rooms are exactly the last published list
            prop_assert_eq!(home.rooms(), last_rooms.as_slice());
            prop_assert_eq!(home.is_loading_rooms(), last_rooms.is_empty());

            // Filtered rooms are an order-preserving subsequence of the rooms
            let mut remaining = home.rooms().iter();
            for filtered in home.search_filtered_rooms() {
                prop_assert!(remaining.any(|room| room == filtered));
                prop_assert!(filtered.matches_query(home.search_query()));
            }

            // Banner shows until the session is verified
            let banner = last_verification.is_some_and(|state| state != VerificationState::Verified);
            prop_assert_eq!(home.shows_verification_banner(), banner);
            prop_assert_eq!(home.verify_session().is_empty(), !banner);

            // The user id stands in for a missing display name
            prop_assert_eq!(home.user_display_name(), last_name.as_deref().unwrap_or("@me:x"));
        }
    }

    #[test]
    fn prop_empty_query_shows_every_room(rooms in prop::collection::vec(room_strategy(), 0..10)) {
        let mut home = HomeScreen::new(UserId::new("@me:x").unwrap());
        home.handle(HomeEvent::RoomsUpdated(rooms.clone()));

        prop_assert_eq!(home.search_filtered_rooms().len(), rooms.len());
    }

    #[test]
    fn prop_start_chat_settles_after_every_outcome(
        events in prop::collection::vec(start_chat_event_strategy(), 0..30)
    ) {
        let mut screen = StartChatScreen::new();

        for event in events {
            let outcome = matches!(
                event,
                StartChatEvent::ExistingDirectChat(_)
                    | StartChatEvent::DirectChatCreated(_)
                    | StartChatEvent::InviteNeeded(_)
                    | StartChatEvent::StartChatFailed
            );
            let invite = match &event {
                StartChatEvent::InviteNeeded(user) => Some(user.clone()),
                _ => None,
            };

            let actions = screen.handle(event);
            prop_assert!(!actions.is_empty());

            if outcome {
                prop_assert!(!screen.is_loading());
                prop_assert_eq!(screen.selected_user_to_invite(), invite.as_ref());
            }
        }
    }
}
