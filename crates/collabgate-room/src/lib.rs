//! Room addressing for Collabgate.
//!
//! Every collaborative document is synchronized over its own channel. This
//! crate answers one question: *which* channel?
//!
//! - [`RoomId`] is a room name plus a document id, with a canonical string
//!   key (`"<roomName>-<documentId>"`)
//! - [`ChannelAddress`] is the full `ws(s)://host:port/<roomKey>` address,
//!   with an optional room password carried out-of-band
//! - [`RoomConfig`] is where the collaboration server lives and which room
//!   name to use by default
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← opens one channel per RoomId
//!     ↕
//! Room Addressing (this crate)  ← pure, no I/O
//! ```

mod address;
mod config;
mod error;

pub use address::{ChannelAddress, PASSWORD_PARAM, RoomId};
pub use config::RoomConfig;
pub use error::RoomError;
