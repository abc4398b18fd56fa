//! The session manager: one session per room.
//!
//! This is the entry point for opening and closing collaboration channels.
//! It enforces the key invariant of the session layer: at most one session
//! per [`RoomId`] at any time.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself. It uses a plain
//! `HashMap` and is meant to be owned by whatever owns the UI state (or
//! wrapped in a mutex at a higher level). The sessions it tracks each run
//! in their own task, so nothing here blocks on the network.

use std::collections::HashMap;
use std::sync::Arc;

use collabgate_room::{RoomConfig, RoomId};
use collabgate_transport::Connector;

use crate::driver::spawn_session;
use crate::{CollabStatus, SessionConfig, SessionError, SessionHandle};

/// Manages all open collaboration sessions.
///
/// ## Lifecycle
///
/// ```text
/// open() ──→ [Connecting] ⇄ [Connected] / [Disconnected]
///   ↑                            │
///   │                            ▼ (retry ceiling)
///   └──── open() again ←──── [Failed]
///
/// close() ──→ [Closed] (session removed from the manager)
/// ```
pub struct SessionManager<C: Connector> {
    /// Open sessions, keyed by room.
    sessions: HashMap<RoomId, SessionHandle>,

    /// Shared by every session driver.
    connector: Arc<C>,

    /// Where the collaboration server lives.
    rooms: RoomConfig,

    /// Timeout and retry policy for new sessions.
    config: SessionConfig,
}

impl<C: Connector> SessionManager<C> {
    /// Creates a new, empty session manager.
    pub fn new(connector: C, rooms: RoomConfig, config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            connector: Arc::new(connector),
            rooms,
            config,
        }
    }

    pub fn room_config(&self) -> &RoomConfig {
        &self.rooms
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens a session for `room` and starts connecting.
    ///
    /// `password` overrides the configured room password for private rooms.
    /// A `Failed` or `Closed` session for the same room is replaced; this is
    /// the explicit re-open a failed session needs. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyOpen`] if the room has a live session
    /// - [`SessionError::Address`] if the channel address can't be built
    pub fn open(
        &mut self,
        room: RoomId,
        password: Option<&str>,
    ) -> Result<&SessionHandle, SessionError> {
        if let Some(existing) = self.sessions.get(&room) {
            if !existing.is_terminal() {
                return Err(SessionError::AlreadyOpen(room));
            }
            tracing::debug!(
                %room,
                state = %existing.state(),
                "replacing terminal session"
            );
        }

        let address = self.rooms.address(&room, password)?;
        let handle = spawn_session(
            room.clone(),
            address,
            self.config.clone(),
            Arc::clone(&self.connector),
        );

        // Inserting drops any replaced handle, which lets its driver exit.
        Ok(self.sessions.entry(room).insert_entry(handle).into_mut())
    }

    /// Opens the session for `document_id` in the default room.
    pub fn open_document(
        &mut self,
        document_id: &str,
        password: Option<&str>,
    ) -> Result<&SessionHandle, SessionError> {
        let room = self.rooms.room_for(document_id);
        self.open(room, password)
    }

    /// Closes and forgets the session for `room`.
    ///
    /// Closing a room with no session (or closing twice) is a no-op.
    pub async fn close(&mut self, room: &RoomId) {
        if let Some(handle) = self.sessions.remove(room) {
            handle.close().await;
        }
    }

    /// Closes every session. Used at process teardown.
    pub async fn close_all(&mut self) {
        for (_, handle) in self.sessions.drain() {
            handle.close().await;
        }
    }

    /// The status of `room`. A room with no session is `Disconnected`.
    pub fn status(&self, room: &RoomId) -> CollabStatus {
        self.sessions
            .get(room)
            .map_or(CollabStatus::Disconnected, SessionHandle::status)
    }

    /// Looks up the session for `room`.
    pub fn get(&self, room: &RoomId) -> Option<&SessionHandle> {
        self.sessions.get(room)
    }

    /// Returns the number of tracked sessions (any state).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
