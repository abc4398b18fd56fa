//! Session types: the state machine behind one collaboration channel.
//!
//! A session tracks:
//! - WHICH room it belongs to (`RoomId`)
//! - WHAT state the channel is in (connecting, connected, ...)
//! - HOW MANY consecutive reconnects it has spent
//!
//! Everything here is pure. The driver task feeds transport events and
//! timer expiries into these transitions and acts on what they return.

use std::fmt;

use collabgate_room::RoomId;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
///                ┌──────(connect signal)──────┐
///                │                            ▼
/// Disconnected ──┴──→ Connecting         Connected
///      ↑  │               │                   │
///      │  │        (error/timeout)     (abnormal close)
///      │  │               ▼                   │
///      │  └──────── Disconnected ←────────────┘
///      │                  │
///      └──(retry timer)───┤
///                         ▼ (ceiling reached)
///                       Failed
///
///   any non-terminal state ──(close)──→ Closed
/// ```
///
/// - **Disconnected**: no channel. Either not started yet or waiting for
///   the retry timer.
/// - **Connecting**: an attempt is in flight and the connection-timeout
///   timer is armed.
/// - **Connected**: the channel is open.
/// - **Failed**: the retry ceiling was reached. Terminal until re-opened.
/// - **Closed**: the user closed the session. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
    Closed,
}

impl SessionState {
    /// Returns `true` for `Failed` and `Closed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }

    /// Projects the state into the coarse status shown to users.
    pub fn status(self) -> CollabStatus {
        match self {
            Self::Connected => CollabStatus::Connected,
            Self::Connecting => CollabStatus::Connecting,
            Self::Disconnected | Self::Failed | Self::Closed => {
                CollabStatus::Disconnected
            }
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Failed => write!(f, "Failed"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// CollabStatus
// ---------------------------------------------------------------------------

/// What the UI shows next to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollabStatus {
    Connected,
    Connecting,
    Disconnected,
    /// The session exists but its state can't be trusted (its driver went
    /// away without reaching a terminal state).
    Unknown,
}

impl CollabStatus {
    /// Projects an optional snapshot. No session means `Disconnected`.
    pub fn of(snapshot: Option<SessionSnapshot>) -> Self {
        snapshot.map_or(Self::Disconnected, |s| s.state.status())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CollabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// A point-in-time copy of a session's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Consecutive reconnect attempts spent since the last successful
    /// connect. Never exceeds the configured ceiling.
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What to do after a connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Schedule reconnect number `attempt` after the retry interval.
    Retry { attempt: u32 },
    /// The ceiling was reached; the session is now `Failed`.
    Exhausted,
    /// The session was not in a state where a failure means anything
    /// (already disconnected, failed, or closed).
    Ignored,
}

/// One room's session record.
#[derive(Debug, Clone)]
pub struct Session {
    room: RoomId,
    state: SessionState,
    attempts: u32,
    max_attempts: u32,
}

impl Session {
    /// Creates a `Disconnected` session that may reconnect up to
    /// `max_attempts` times in a row.
    pub fn new(room: RoomId, max_attempts: u32) -> Self {
        Self {
            room,
            state: SessionState::Disconnected,
            attempts: 0,
            max_attempts,
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            attempts: self.attempts,
        }
    }

    /// `Disconnected → Connecting`. Returns `false` (and changes nothing)
    /// from any other state.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Connecting;
        true
    }

    /// `Connecting → Connected`, resetting the attempt count.
    pub fn mark_connected(&mut self) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.state = SessionState::Connected;
        self.attempts = 0;
        true
    }

    /// Records a failed attempt, a timeout, or an abnormal close.
    ///
    /// The session drops to `Disconnected`. If it still has attempts left
    /// the count goes up by one and the caller should schedule a retry;
    /// otherwise the session becomes `Failed`.
    pub fn connection_lost(&mut self) -> Recovery {
        if !matches!(
            self.state,
            SessionState::Connecting | SessionState::Connected
        ) {
            return Recovery::Ignored;
        }

        if self.attempts < self.max_attempts {
            self.attempts += 1;
            self.state = SessionState::Disconnected;
            Recovery::Retry {
                attempt: self.attempts,
            }
        } else {
            self.state = SessionState::Failed;
            Recovery::Exhausted
        }
    }

    /// Moves to `Closed`. Returns `false` if the session was already
    /// closed, so a second close is a no-op.
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }
}
