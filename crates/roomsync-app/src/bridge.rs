//! Session-to-screen translation layer.
//!
//! The [`Bridge`] wraps the [`SessionClient`] and adapts it to the screen
//! state machines.
//!
//! # Responsibilities
//!
//! - Executes [`crate::StartChatAction`]s and verification requests against
//!   the session client.
//! - Loads the home screen's own-profile data.
//! - Converts results, including failures, back into screen events. Errors
//!   never escape as `Err`: they become events the screens can show.

use roomsync_client::{
    DirectChatLookup, ProfileSearch, SearchOutcome, SessionClient, SessionVerification,
    VerificationState, lookup_direct_chat, start_direct_chat, verify_session,
};
use roomsync_core::{SessionError, SessionSdk};

use crate::{HomeAction, HomeEvent, StartChatAction, StartChatEvent};

/// Bridge between the screens and the session client.
pub struct Bridge<S: SessionSdk> {
    client: SessionClient<S>,
    search: ProfileSearch<S>,
    verification: Option<SessionVerification<S::Verification>>,
}

impl<S: SessionSdk> Bridge<S> {
    /// Create a bridge over `client`.
    pub fn new(client: SessionClient<S>) -> Self {
        let search = ProfileSearch::new(client.clone());
        Self { client, search, verification: None }
    }

    /// Session client.
    pub fn client(&self) -> &SessionClient<S> {
        &self.client
    }

    /// Load the own-profile data shown on the home screen.
    ///
    /// Display name and avatar are independent: one failing does not stop
    /// the other.
    pub async fn load_home(&mut self) -> Vec<HomeEvent> {
        let mut events = Vec::with_capacity(3);

        events.push(match self.client.load_display_name().await {
            Ok(name) => HomeEvent::DisplayNameLoaded(name),
            Err(e) => {
                tracing::debug!(error = %e, "using default display name");
                HomeEvent::DisplayNameUnavailable
            },
        });

        events.push(match self.client.load_avatar_url().await {
            Ok(url) => HomeEvent::AvatarLoaded(url),
            Err(e) => {
                tracing::debug!(error = %e, "using default avatar");
                HomeEvent::AvatarUnavailable
            },
        });

        events.push(match self.verification().await {
            Ok(flow) => HomeEvent::VerificationChanged(flow.state()),
            Err(e) => Self::error(&e),
        });

        events
    }

    /// Execute a home action. Navigation and rendering produce no events.
    pub async fn process_home_action(&mut self, action: HomeAction) -> Vec<HomeEvent> {
        match action {
            HomeAction::StartVerification => match self.verification().await {
                Ok(flow) => match flow.request().await {
                    Ok(state) => vec![HomeEvent::VerificationChanged(state)],
                    Err(e) => vec![HomeEvent::VerificationChanged(flow.state()), Self::error(&e)],
                },
                Err(e) => vec![Self::error(&e)],
            },
            HomeAction::Render
            | HomeAction::OpenRoom { .. }
            | HomeAction::ShowSettings
            | HomeAction::ShowStartChat => vec![],
        }
    }

    /// Confirm (`true`) or reject (`false`) the verification comparison.
    pub async fn confirm_verification(&mut self, matches: bool) -> Vec<HomeEvent> {
        let Some(flow) = &self.verification else {
            return vec![];
        };
        let result = if matches { flow.approve().await } else { flow.decline().await };
        match result {
            Ok(state) => vec![HomeEvent::VerificationChanged(state)],
            Err(e) => vec![HomeEvent::VerificationChanged(VerificationState::Failed), Self::error(&e)],
        }
    }

    /// Load search suggestions for the start-chat screen.
    pub async fn load_suggestions(&mut self) -> Vec<StartChatEvent> {
        match self.search.load_suggestions().await {
            Ok(()) => vec![StartChatEvent::SectionUpdated(self.search.section().clone())],
            Err(e) => {
                tracing::warn!(error = %e, "failed loading search suggestions");
                vec![]
            },
        }
    }

    /// Check if a directory search is in flight.
    pub fn is_searching(&self) -> bool {
        self.search.pending_query().is_some()
    }

    /// Wait for the directory search in flight and convert its result.
    ///
    /// Without a search in flight this returns no events. A newer
    /// [`StartChatAction::Search`] processed before this call aborts the
    /// pending search, so only the latest query's result is applied.
    pub async fn settle_search(&mut self) -> Vec<StartChatEvent> {
        if !self.is_searching() {
            return vec![];
        }
        match self.search.settle().await {
            Ok(()) => vec![StartChatEvent::SectionUpdated(self.search.section().clone())],
            Err(_) => vec![StartChatEvent::SearchFailed],
        }
    }

    /// Execute a start-chat action. Navigation and rendering produce no
    /// events.
    ///
    /// A search long enough to reach the directory only starts here; its
    /// result arrives through [`Bridge::settle_search`].
    pub async fn process_start_chat_action(
        &mut self,
        action: StartChatAction,
    ) -> Vec<StartChatEvent> {
        match action {
            StartChatAction::Search { query } => match self.search.search(&query) {
                SearchOutcome::ShowingSuggestions => {
                    vec![StartChatEvent::SectionUpdated(self.search.section().clone())]
                },
                SearchOutcome::Started => vec![],
            },
            StartChatAction::LookupDirectChat { user } => {
                match lookup_direct_chat(&self.client, &user).await {
                    Ok(DirectChatLookup::Existing(room_id)) => {
                        vec![StartChatEvent::ExistingDirectChat(room_id)]
                    },
                    Ok(DirectChatLookup::NotFound) => vec![StartChatEvent::InviteNeeded(user)],
                    Err(_) => vec![StartChatEvent::StartChatFailed],
                }
            },
            StartChatAction::CreateDirectChat { user } => {
                match start_direct_chat(&self.client, &user).await {
                    Ok(room_id) => vec![StartChatEvent::DirectChatCreated(room_id)],
                    Err(_) => vec![StartChatEvent::StartChatFailed],
                }
            },
            StartChatAction::Render
            | StartChatAction::OpenRoom { .. }
            | StartChatAction::CreateRoom
            | StartChatAction::Close => vec![],
        }
    }

    /// Acquire the verification flow once and reuse it.
    async fn verification(
        &mut self,
    ) -> Result<&SessionVerification<S::Verification>, SessionError> {
        let flow = match self.verification.take() {
            Some(flow) => flow,
            None => verify_session(&self.client).await?,
        };
        Ok(self.verification.insert(flow))
    }

    fn error(e: &SessionError) -> HomeEvent {
        HomeEvent::Error { message: e.user_message().to_owned() }
    }
}
