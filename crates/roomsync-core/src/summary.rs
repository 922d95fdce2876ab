//! Derived per-room summary records.
//!
//! A [`RoomSummary`] is rebuilt from scratch every time the resolver
//! processes its room; it is never patched field by field from older data.

use serde::{Deserialize, Serialize};

use crate::RoomId;

/// UI-agnostic summary of one room's presentation-relevant state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room this summary describes. Never empty, never reassigned.
    pub id: RoomId,
    /// Computed room name. `None` if the room has no usable name yet.
    pub display_name: Option<String>,
    /// Text projection of the latest message. `None` if there is no message;
    /// empty string if the latest message has no textual projection.
    pub last_message_preview: Option<String>,
    /// Room is a direct chat.
    pub is_direct: bool,
    /// Room has encryption enabled.
    pub is_encrypted: bool,
    /// Unread notification count.
    pub unread_count: u64,
}

impl RoomSummary {
    /// Create a summary with only the identifier set.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            display_name: None,
            last_message_preview: None,
            is_direct: false,
            is_encrypted: false,
            unread_count: 0,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the unread count.
    #[must_use]
    pub fn with_unread_count(mut self, count: u64) -> Self {
        self.unread_count = count;
        self
    }

    /// Check if the display name contains `query`, ignoring case.
    ///
    /// An empty query matches every room. A room without a display name never
    /// matches a non-empty query.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.display_name.as_deref().is_some_and(|name| name.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: Option<&str>) -> RoomSummary {
        let summary = RoomSummary::new(RoomId::new("!r:x").unwrap());
        match name {
            Some(name) => summary.with_display_name(name),
            None => summary,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(summary(None).matches_query(""));
        assert!(summary(Some("Alice")).matches_query(""));
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let room = summary(Some("Weekend Climbing"));
        assert!(room.matches_query("climb"));
        assert!(room.matches_query("WEEKEND"));
        assert!(!room.matches_query("hiking"));
    }

    #[test]
    fn unnamed_room_never_matches_non_empty_query() {
        assert!(!summary(None).matches_query("a"));
    }

    #[test]
    fn summary_serializes_to_stable_json() {
        let room = summary(Some("Alice")).with_unread_count(2);
        insta::assert_snapshot!(serde_json::to_string(&room).unwrap(), @r#"{"id":"!r:x","display_name":"Alice","last_message_preview":null,"is_direct":false,"is_encrypted":false,"unread_count":2}"#);
    }
}
