//! Start-chat screen state machine.
//!
//! Searching shows either suggestions or results. Selecting a user opens
//! the existing direct chat if there is one, or asks to confirm an invite
//! first. Every failure to start a chat raises the same generic alert.

use roomsync_client::{UsersSection, UsersSectionKind};
use roomsync_core::UserProfile;

use crate::{StartChatAction, StartChatAlert, StartChatEvent};

/// Start-chat screen state machine.
#[derive(Debug, Clone)]
pub struct StartChatScreen {
    query: String,
    section: UsersSection,
    selected_user_to_invite: Option<UserProfile>,
    alert: Option<StartChatAlert>,
    is_loading: bool,
}

impl Default for StartChatScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl StartChatScreen {
    /// Create the screen with an empty suggestions section.
    pub fn new() -> Self {
        Self {
            query: String::new(),
            section: UsersSection { kind: UsersSectionKind::Suggestions, users: Vec::new() },
            selected_user_to_invite: None,
            alert: None,
            is_loading: false,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: StartChatEvent) -> Vec<StartChatAction> {
        match event {
            StartChatEvent::SectionUpdated(section) => {
                self.section = section;
                vec![StartChatAction::Render]
            },
            StartChatEvent::ExistingDirectChat(room_id) | StartChatEvent::DirectChatCreated(room_id) => {
                self.is_loading = false;
                self.selected_user_to_invite = None;
                vec![StartChatAction::OpenRoom { room_id }, StartChatAction::Render]
            },
            StartChatEvent::InviteNeeded(user) => {
                self.is_loading = false;
                self.selected_user_to_invite = Some(user);
                vec![StartChatAction::Render]
            },
            StartChatEvent::StartChatFailed => {
                self.is_loading = false;
                self.selected_user_to_invite = None;
                self.alert = Some(StartChatAlert::StartChatFailed);
                vec![StartChatAction::Render]
            },
            StartChatEvent::SearchFailed => {
                self.alert = Some(StartChatAlert::SearchFailed);
                vec![StartChatAction::Render]
            },
        }
    }

    /// Search for users. The bridge decides whether the query is long
    /// enough to reach the server.
    pub fn search(&mut self, query: impl Into<String>) -> Vec<StartChatAction> {
        self.query = query.into();
        vec![StartChatAction::Search { query: self.query.clone() }]
    }

    /// Select a user from the section.
    pub fn select_user(&mut self, user: UserProfile) -> Vec<StartChatAction> {
        self.is_loading = true;
        vec![StartChatAction::LookupDirectChat { user }, StartChatAction::Render]
    }

    /// Confirm the pending invite.
    pub fn create_direct_chat(&mut self) -> Vec<StartChatAction> {
        match self.selected_user_to_invite.clone() {
            Some(user) => {
                self.is_loading = true;
                vec![StartChatAction::CreateDirectChat { user }, StartChatAction::Render]
            },
            None => vec![],
        }
    }

    /// Drop the pending invite.
    pub fn dismiss_invite(&mut self) -> Vec<StartChatAction> {
        self.selected_user_to_invite = None;
        vec![StartChatAction::Render]
    }

    /// Dismiss the alert.
    pub fn dismiss_alert(&mut self) -> Vec<StartChatAction> {
        self.alert = None;
        vec![StartChatAction::Render]
    }

    /// Navigate to room creation.
    pub fn create_room(&self) -> Vec<StartChatAction> {
        vec![StartChatAction::CreateRoom]
    }

    /// Dismiss the screen.
    pub fn close(&self) -> Vec<StartChatAction> {
        vec![StartChatAction::Close]
    }

    /// Current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Users shown.
    pub fn section(&self) -> &UsersSection {
        &self.section
    }

    /// User awaiting invite confirmation.
    pub fn selected_user_to_invite(&self) -> Option<&UserProfile> {
        self.selected_user_to_invite.as_ref()
    }

    /// Alert shown.
    pub fn alert(&self) -> Option<&StartChatAlert> {
        self.alert.as_ref()
    }

    /// Check if a chat lookup or creation is running.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

#[cfg(test)]
mod tests {
    use roomsync_core::{RoomId, UserId};

    use super::*;
    use crate::START_CHAT_FAILED;

    fn bob() -> UserProfile {
        UserProfile::new(UserId::new("@bob:x").unwrap()).with_display_name("Bob")
    }

    #[test]
    fn selecting_user_looks_up_direct_chat() {
        let mut screen = StartChatScreen::new();
        let actions = screen.select_user(bob());

        assert!(screen.is_loading());
        assert_eq!(actions[0], StartChatAction::LookupDirectChat { user: bob() });
    }

    #[test]
    fn missing_chat_asks_for_invite_then_creates() {
        let mut screen = StartChatScreen::new();
        screen.select_user(bob());
        screen.handle(StartChatEvent::InviteNeeded(bob()));

        assert!(!screen.is_loading());
        assert_eq!(screen.selected_user_to_invite(), Some(&bob()));
        assert_eq!(screen.create_direct_chat()[0], StartChatAction::CreateDirectChat { user: bob() });
    }

    #[test]
    fn existing_chat_opens_room() {
        let mut screen = StartChatScreen::new();
        let room_id = RoomId::new("!dm:x").unwrap();
        let actions = screen.handle(StartChatEvent::ExistingDirectChat(room_id.clone()));

        assert_eq!(actions[0], StartChatAction::OpenRoom { room_id });
    }

    #[test]
    fn failure_raises_generic_alert() {
        let mut screen = StartChatScreen::new();
        screen.select_user(bob());
        screen.handle(StartChatEvent::StartChatFailed);

        assert!(!screen.is_loading());
        assert_eq!(screen.alert().map(StartChatAlert::message), Some(START_CHAT_FAILED));

        screen.dismiss_alert();
        assert!(screen.alert().is_none());
    }

    #[test]
    fn confirming_without_selection_does_nothing() {
        let mut screen = StartChatScreen::new();
        assert!(screen.create_direct_chat().is_empty());
    }
}
