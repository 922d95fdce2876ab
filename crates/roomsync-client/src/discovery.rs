//! User directory search.
//!
//! [`ProfileSearch`] backs a single search field. At most one remote search
//! is in flight: starting a new one aborts the previous one, so only the
//! latest query's result can ever be applied. Debouncing belongs to the
//! caller.

use roomsync_core::{SessionError, SessionSdk, UserProfile};
use tokio::task::JoinHandle;

use crate::SessionClient;

/// Which list the users section currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersSectionKind {
    /// Recent conversation counterparts.
    Suggestions,
    /// Results of the last applied search.
    SearchResults,
}

/// Users shown below the search field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersSection {
    /// Section kind.
    pub kind: UsersSectionKind,
    /// Users in display order.
    pub users: Vec<UserProfile>,
}

impl UsersSection {
    fn suggestions(users: Vec<UserProfile>) -> Self {
        Self { kind: UsersSectionKind::Suggestions, users }
    }
}

/// What [`ProfileSearch::search`] did with a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query too short; the section shows suggestions and nothing was sent.
    ShowingSuggestions,
    /// A remote search was started.
    Started,
}

struct InFlight {
    query: String,
    task: JoinHandle<Result<Vec<UserProfile>, SessionError>>,
}

/// Search state for one query field.
pub struct ProfileSearch<S: SessionSdk> {
    client: SessionClient<S>,
    min_len: usize,
    suggestions: Vec<UserProfile>,
    section: UsersSection,
    in_flight: Option<InFlight>,
}

impl<S: SessionSdk> ProfileSearch<S> {
    /// Create a search with no suggestions loaded.
    ///
    /// The minimum query length comes from the session configuration.
    pub fn new(client: SessionClient<S>) -> Self {
        let min_len = client.config().min_search_query_len;
        Self {
            client,
            min_len,
            suggestions: Vec::new(),
            section: UsersSection::suggestions(Vec::new()),
            in_flight: None,
        }
    }

    /// Users currently shown.
    pub fn section(&self) -> &UsersSection {
        &self.section
    }

    /// Query of the search in flight, if any.
    pub fn pending_query(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| f.query.as_str())
    }

    /// Load suggestions from recent conversation counterparts.
    ///
    /// Replaces the shown section only while it shows suggestions.
    pub async fn load_suggestions(&mut self) -> Result<(), SessionError> {
        let users = self.client.recent_conversation_counterparts().await?;
        self.suggestions = users;
        if self.section.kind == UsersSectionKind::Suggestions {
            self.section = UsersSection::suggestions(self.suggestions.clone());
        }
        Ok(())
    }

    /// Submit a query.
    ///
    /// Any search in flight is aborted first. Queries shorter than the
    /// minimum length (in characters) restore the suggestions without a
    /// remote call.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        self.abort();

        if query.chars().count() < self.min_len {
            self.section = UsersSection::suggestions(self.suggestions.clone());
            return SearchOutcome::ShowingSuggestions;
        }

        let client = self.client.clone();
        let owned = query.to_owned();
        let task = tokio::spawn(async move { client.search_profiles(owned).await });
        self.in_flight = Some(InFlight { query: query.to_owned(), task });

        tracing::trace!(query, "profile search started");
        SearchOutcome::Started
    }

    /// Wait for the search in flight and apply its result.
    ///
    /// A failed search leaves the section unchanged and is returned. Without
    /// a search in flight this returns immediately.
    pub async fn settle(&mut self) -> Result<(), SessionError> {
        let Some(InFlight { query, task }) = self.in_flight.take() else {
            return Ok(());
        };

        let users = task.await.map_err(|e| SessionError::TaskFailed { reason: e.to_string() })?;
        match users {
            Ok(users) => {
                tracing::debug!(%query, results = users.len(), "profile search applied");
                self.section = UsersSection { kind: UsersSectionKind::SearchResults, users };
                Ok(())
            },
            Err(e) => {
                tracing::warn!(%query, error = %e, "profile search failed");
                Err(e)
            },
        }
    }

    /// Abort the search in flight, if any.
    pub fn abort(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.task.abort();
            tracing::trace!(query = %previous.query, "profile search superseded");
        }
    }
}

impl<S: SessionSdk> Drop for ProfileSearch<S> {
    fn drop(&mut self) {
        self.abort();
    }
}
