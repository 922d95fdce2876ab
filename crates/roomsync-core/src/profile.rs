//! User directory profiles.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Public profile of a user as returned by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub user_id: UserId,
    /// Display name. `None` if the user has not set one.
    pub display_name: Option<String>,
    /// Avatar content URL. `None` if the user has no avatar.
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Create a profile with only the user id set.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, display_name: None, avatar_url: None }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
