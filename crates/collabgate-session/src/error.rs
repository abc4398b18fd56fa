//! Error types for the session layer.

use collabgate_room::{RoomError, RoomId};

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The room already has a live session (connecting, connected, or
    /// waiting to retry). Only one session per room may exist.
    #[error("room {0} already has an open session")]
    AlreadyOpen(RoomId),

    /// The session used up its reconnect attempts and is now terminal.
    /// It stays disconnected until the room is opened again.
    #[error("room {0} gave up reconnecting")]
    RetryExhausted(RoomId),

    /// The session was closed by the user.
    #[error("session for room {0} is closed")]
    Closed(RoomId),

    /// The session's driver task is gone without reaching a terminal state.
    #[error("session for room {0} is unavailable")]
    Unavailable(RoomId),

    /// The channel address could not be built.
    #[error(transparent)]
    Address(#[from] RoomError),
}
