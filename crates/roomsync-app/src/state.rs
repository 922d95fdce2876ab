//! Observable view-model state types.

/// User-facing text for a failed chat start.
///
/// The underlying cause is not shown.
pub const START_CHAT_FAILED: &str = "could not start chat";

/// Alert shown on the start-chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartChatAlert {
    /// Starting the chat failed.
    StartChatFailed,
    /// The user search failed.
    SearchFailed,
}

impl StartChatAlert {
    /// Alert text.
    pub fn message(&self) -> &'static str {
        match self {
            Self::StartChatFailed => START_CHAT_FAILED,
            Self::SearchFailed => "search failed",
        }
    }
}
