//! # Collabgate
//!
//! Client-side session and authorization layer for real-time document
//! collaboration.
//!
//! A collaborative editor needs two things from the network: a channel per
//! open document to a collaboration server, and an authenticated REST
//! backend for files. Collabgate provides both behind one
//! [`CollabClient`]:
//!
//! - collaboration channels with connection timeouts and bounded,
//!   fixed-interval reconnects (`collabgate-session`)
//! - a shared auth state, a request gateway that signs out on 401, and a
//!   route guard (`collabgate-auth`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collabgate::prelude::*;
//!
//! # async fn run() -> Result<(), CollabError> {
//! let config = CollabConfig::from_env()?;
//! collabgate::init_tracing(&config.log);
//!
//! let mut client = CollabClient::from_config(config)?;
//! client.store().login("ada@example.com", "password123").await?;
//!
//! let session = client.open_document("8aee99ec")?;
//! session.connected().await?;
//! println!("{}", client.document_status("8aee99ec"));
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod telemetry;

pub use client::CollabClient;
pub use config::{CollabConfig, ConfigError, ENV_PREFIX};
pub use error::CollabError;
pub use telemetry::init_tracing;

pub use collabgate_auth as auth;
pub use collabgate_room as room;
pub use collabgate_session as session;
pub use collabgate_transport as transport;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{CollabClient, CollabConfig, CollabError};
    pub use collabgate_auth::{
        ApiError, AuthContext, AuthError, AuthStore, FilesApi, GuardDecision, Navigation,
        Redirect, RequestGateway, RouteGuard, RouteMeta, RouteTable, ShareToken, Token,
        UserProfile,
    };
    pub use collabgate_room::{ChannelAddress, RoomConfig, RoomId};
    pub use collabgate_session::{
        CollabStatus, SessionConfig, SessionError, SessionHandle, SessionManager, SessionState,
    };
    pub use collabgate_transport::{Channel, CloseSignal, Connector, TransportError};
}
