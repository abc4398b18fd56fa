//! WebSocket client transport using `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use collabgate_room::ChannelAddress;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{Channel, CloseSignal, ConnectionId, Connector, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Where inbound payloads go (the sync engine's input queue).
pub type InboundSender = mpsc::UnboundedSender<Vec<u8>>;

/// A [`Connector`] that dials collaboration rooms over WebSocket.
#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector {
    inbound: Option<InboundSender>,
}

impl WebSocketConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards every payload received on channels opened by this connector
    /// to `inbound`. Without a sink, payloads are dropped.
    pub fn with_inbound(mut self, inbound: InboundSender) -> Self {
        self.inbound = Some(inbound);
        self
    }
}

impl Connector for WebSocketConnector {
    type Channel = WebSocketChannel;

    fn connect(
        &self,
        address: &ChannelAddress,
    ) -> impl Future<Output = Result<Self::Channel, TransportError>> + Send
    {
        let url = address.connect_url();
        let shown = address.to_string();
        let inbound = self.inbound.clone();

        async move {
            let (ws, _response) =
                tokio_tungstenite::connect_async(url.as_str())
                    .await
                    .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

            let id = ConnectionId::new(
                NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            );
            tracing::debug!(%id, address = %shown, "WebSocket channel open");

            Ok(WebSocketChannel { id, ws, inbound })
        }
    }
}

/// A single WebSocket channel to a room.
pub struct WebSocketChannel {
    id: ConnectionId,
    ws: WsStream,
    inbound: Option<InboundSender>,
}

impl WebSocketChannel {
    fn forward(&self, data: Vec<u8>) {
        if let Some(inbound) = &self.inbound {
            if inbound.send(data).is_err() {
                tracing::trace!(id = %self.id, "inbound sink gone, dropping payload");
            }
        }
    }
}

impl Channel for WebSocketChannel {
    async fn closed(&mut self) -> CloseSignal {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Binary(data))) => self.forward(data.to_vec()),
                Some(Ok(Message::Text(text))) => {
                    self.forward(text.as_bytes().to_vec())
                }
                Some(Ok(Message::Close(_))) | None => {
                    return CloseSignal::Remote;
                }
                Some(Ok(_)) => continue, // ping/pong/frame
                Some(Err(e)) => {
                    return CloseSignal::Lost(TransportError::ConnectionLost(
                        e.to_string(),
                    ));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.ws.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::CloseFailed(e.to_string())),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
