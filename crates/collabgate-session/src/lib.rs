//! Collaboration session management for Collabgate.
//!
//! A *session* is our in-memory record of one room's channel: whether it is
//! connecting, connected, waiting to retry, or given up. This crate handles
//! the lifecycle of those channels:
//!
//! 1. **Opening**: one session per [`RoomId`](collabgate_room::RoomId)
//!    ([`SessionManager::open`])
//! 2. **Supervision**: a connection timeout per attempt and fixed-interval
//!    reconnects up to a hard ceiling ([`SessionConfig`])
//! 3. **Projection**: a coarse [`CollabStatus`] for the UI
//!
//! Each session is driven by its own Tokio task that owns the session record
//! and its timer. Callers talk to it through a [`SessionHandle`].
//!
//! # How it fits in the stack
//!
//! ```text
//! UI / facade (above)  ← open a document, show its status
//!     ↕
//! Session Layer (this crate)  ← state machine, retry policy, timers
//!     ↕
//! Transport Layer (below)  ← Connector / Channel
//! ```

mod config;
mod driver;
mod error;
mod manager;
mod session;
mod timer;

pub use config::SessionConfig;
pub use driver::SessionHandle;
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{CollabStatus, Recovery, Session, SessionSnapshot, SessionState};
