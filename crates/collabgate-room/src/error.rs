//! Error types for room addressing.

/// Errors that can occur while building a channel address.
///
/// Building a [`RoomId`](crate::RoomId) key never fails. Only turning it
/// into a network address can, and only when the configured host is bad.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The host could not be parsed as a URL.
    #[error("invalid collaboration host {0:?}: {1}")]
    InvalidHost(String, #[source] url::ParseError),

    /// The host URL has a scheme other than `ws` or `wss`.
    #[error("unsupported scheme {0:?} (expected ws or wss)")]
    UnsupportedScheme(String),

    /// The host URL cannot carry a path (e.g. `data:` URLs).
    #[error("host {0} cannot be used as a base address")]
    NotABase(String),
}
