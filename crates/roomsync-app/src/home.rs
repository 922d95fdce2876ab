//! Home screen state machine.
//!
//! This is a pure state machine: it consumes [`crate::HomeEvent`] inputs and
//! produces [`crate::HomeAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mirrors the coordinator's published room list.
//! - Tracks the user's display name and avatar, falling back to a default
//!   presentation when either fails to load.
//! - Shows the verification banner until the session is verified.
//! - Filters rooms by the search query.

use roomsync_client::VerificationState;
use roomsync_core::{RoomId, RoomSummary, UserId};

use crate::{HomeAction, HomeEvent};

/// Home screen state machine.
#[derive(Debug, Clone)]
pub struct HomeScreen {
    user_id: UserId,
    display_name: Option<String>,
    avatar_url: Option<String>,
    rooms: Vec<RoomSummary>,
    show_verification_banner: bool,
    search_query: String,
    error: Option<String>,
}

impl HomeScreen {
    /// Create the screen for `user_id` with no rooms yet.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
            avatar_url: None,
            rooms: Vec::new(),
            show_verification_banner: false,
            search_query: String::new(),
            error: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: HomeEvent) -> Vec<HomeAction> {
        match event {
            HomeEvent::RoomsUpdated(rooms) => {
                self.rooms = rooms;
            },
            HomeEvent::DisplayNameLoaded(name) => {
                self.display_name = Some(name);
            },
            HomeEvent::DisplayNameUnavailable => {
                self.display_name = None;
            },
            HomeEvent::AvatarLoaded(url) => {
                self.avatar_url = Some(url);
            },
            HomeEvent::AvatarUnavailable => {
                self.avatar_url = None;
            },
            HomeEvent::VerificationChanged(state) => {
                self.show_verification_banner = state != VerificationState::Verified;
            },
            HomeEvent::SearchQueryChanged(query) => {
                self.search_query = query;
            },
            HomeEvent::Error { message } => {
                self.error = Some(message);
            },
        }
        vec![HomeAction::Render]
    }

    /// Open a room from the list. Rooms no longer listed are ignored.
    pub fn select_room(&self, room_id: &RoomId) -> Vec<HomeAction> {
        if self.rooms.iter().any(|room| &room.id == room_id) {
            vec![HomeAction::OpenRoom { room_id: room_id.clone() }]
        } else {
            tracing::debug!(%room_id, "selected room is not listed");
            vec![]
        }
    }

    /// Open settings from the avatar.
    pub fn tap_user_avatar(&self) -> Vec<HomeAction> {
        vec![HomeAction::ShowSettings]
    }

    /// Open the start-chat screen.
    pub fn start_chat(&self) -> Vec<HomeAction> {
        vec![HomeAction::ShowStartChat]
    }

    /// Start verification from the banner. No-op once verified.
    pub fn verify_session(&self) -> Vec<HomeAction> {
        if self.show_verification_banner { vec![HomeAction::StartVerification] } else { vec![] }
    }

    /// Dismiss the current error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Authenticated user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Name to show for the user: the display name, or the user id if it
    /// could not be loaded.
    pub fn user_display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.user_id.as_str())
    }

    /// Avatar URL. `None` shows the default avatar.
    pub fn user_avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Rooms in published order.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Rooms whose name matches the search query.
    pub fn search_filtered_rooms(&self) -> Vec<&RoomSummary> {
        self.rooms.iter().filter(|room| room.matches_query(&self.search_query)).collect()
    }

    /// Check if the room list has not arrived yet.
    pub fn is_loading_rooms(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Check if the verification banner is shown.
    pub fn shows_verification_banner(&self) -> bool {
        self.show_verification_banner
    }

    /// Current search query.
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Error shown to the user. `None` if there is none.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, name: &str) -> RoomSummary {
        RoomSummary::new(RoomId::new(id).unwrap()).with_display_name(name)
    }

    fn home() -> HomeScreen {
        HomeScreen::new(UserId::new("@me:x").unwrap())
    }

    #[test]
    fn loading_until_rooms_arrive() {
        let mut home = home();
        assert!(home.is_loading_rooms());

        home.handle(HomeEvent::RoomsUpdated(vec![room("!a:x", "Alice")]));
        assert!(!home.is_loading_rooms());
    }

    #[test]
    fn display_name_falls_back_to_user_id() {
        let mut home = home();
        home.handle(HomeEvent::DisplayNameUnavailable);
        assert_eq!(home.user_display_name(), "@me:x");

        home.handle(HomeEvent::DisplayNameLoaded("Me".into()));
        assert_eq!(home.user_display_name(), "Me");
    }

    #[test]
    fn search_filters_by_name() {
        let mut home = home();
        home.handle(HomeEvent::RoomsUpdated(vec![
            room("!a:x", "Alice"),
            room("!b:x", "Bob"),
            room("!c:x", "Malice"),
        ]));
        home.handle(HomeEvent::SearchQueryChanged("ALI".into()));

        let names: Vec<_> =
            home.search_filtered_rooms().iter().filter_map(|r| r.display_name.as_deref()).collect();
        assert_eq!(names, vec!["Alice", "Malice"]);
    }

    #[test]
    fn verification_banner_follows_state() {
        let mut home = home();
        home.handle(HomeEvent::VerificationChanged(VerificationState::Initial));
        assert!(home.shows_verification_banner());
        assert_eq!(home.verify_session(), vec![HomeAction::StartVerification]);

        home.handle(HomeEvent::VerificationChanged(VerificationState::Verified));
        assert!(!home.shows_verification_banner());
        assert!(home.verify_session().is_empty());
    }

    #[test]
    fn selecting_unlisted_room_does_nothing() {
        let mut home = home();
        let listed = room("!a:x", "Alice");
        home.handle(HomeEvent::RoomsUpdated(vec![listed.clone()]));

        assert_eq!(home.select_room(&listed.id), vec![HomeAction::OpenRoom { room_id: listed.id }]);
        assert!(home.select_room(&RoomId::new("!gone:x").unwrap()).is_empty());
    }
}
