//! Client transport abstraction for Collabgate.
//!
//! The session layer does not speak any wire protocol itself. It only needs
//! to "open a duplex channel to an address" and to learn when that channel
//! stops being connected. [`Connector`] and [`Channel`] capture exactly that;
//! the CRDT sync engine behind the channel is somebody else's problem.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{InboundSender, WebSocketChannel, WebSocketConnector};

use std::fmt;
use std::future::Future;

use collabgate_room::ChannelAddress;

/// Opaque identifier for one opened channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why an open channel stopped being connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseSignal {
    /// The server closed the channel (close frame or end of stream).
    Remote,

    /// The channel failed.
    Lost(TransportError),
}

/// Opens channels to collaboration rooms.
///
/// `connect` resolves once the low-level "connected" signal arrives. The
/// caller owns the timeout; a connector may take as long as the network
/// does.
pub trait Connector: Send + Sync + 'static {
    /// The channel type produced by this connector.
    type Channel: Channel;

    /// Opens a channel to `address`.
    fn connect(
        &self,
        address: &ChannelAddress,
    ) -> impl Future<Output = Result<Self::Channel, TransportError>> + Send;
}

/// One open channel.
pub trait Channel: Send + 'static {
    /// Resolves when the channel is no longer connected.
    ///
    /// Must be cancel-safe: the session driver races it against commands
    /// and drops the future when it has something else to do.
    fn closed(&mut self) -> impl Future<Output = CloseSignal> + Send;

    /// Closes the channel from our side.
    fn close(
        &mut self,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this channel.
    fn id(&self) -> ConnectionId;
}
