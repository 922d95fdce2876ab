//! Direct chats with a single user.

use roomsync_core::{RoomId, SessionError, SessionSdk, UserId, UserProfile};

use crate::SessionClient;

/// Outcome of looking for an existing direct chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectChatLookup {
    /// A direct room already exists.
    Existing(RoomId),
    /// None exists; the user has to confirm the invite first.
    NotFound,
}

/// Look for an existing direct chat with `user`.
///
/// # Errors
///
/// - `SessionError::DirectRoomOperationFailed` for any failure, including a
///   closed session.
pub async fn lookup_direct_chat<S: SessionSdk>(
    client: &SessionClient<S>,
    user: &UserProfile,
) -> Result<DirectChatLookup, SessionError> {
    let room = client
        .direct_room_for_user(&user.user_id)
        .await
        .map_err(|e| operation_failed(&user.user_id, e))?;
    Ok(room.map_or(DirectChatLookup::NotFound, DirectChatLookup::Existing))
}

/// Open the direct chat with `user`, creating it if needed.
///
/// The user's display name is suggested as the room name.
///
/// # Errors
///
/// - `SessionError::DirectRoomOperationFailed` for any failure. The cause is
///   logged, not returned.
pub async fn start_direct_chat<S: SessionSdk>(
    client: &SessionClient<S>,
    user: &UserProfile,
) -> Result<RoomId, SessionError> {
    let room_id = client
        .find_or_create_direct_room(&user.user_id, user.display_name.clone())
        .await
        .map_err(|e| operation_failed(&user.user_id, e))?;
    tracing::info!(user_id = %user.user_id, %room_id, "direct chat ready");
    Ok(room_id)
}

/// Collapse any failure into the generic direct-room error. SDK failures are
/// already logged by the session.
fn operation_failed(user_id: &UserId, error: SessionError) -> SessionError {
    if error != SessionError::DirectRoomOperationFailed {
        tracing::warn!(%user_id, %error, "direct chat operation failed");
    }
    SessionError::DirectRoomOperationFailed
}
