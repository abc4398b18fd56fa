/// Errors that can occur in the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The channel could not be opened (refused, DNS, handshake, TLS...).
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// An open channel failed while in use.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Closing the channel failed.
    #[error("close failed: {0}")]
    CloseFailed(String),
}
