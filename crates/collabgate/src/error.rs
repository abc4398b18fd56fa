//! Unified error type for Collabgate.

use collabgate_auth::{ApiError, AuthError};
use collabgate_room::RoomError;
use collabgate_session::SessionError;
use collabgate_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error, so `?` works
/// across layers.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CollabError {
    /// Where to send the user, if this error signed them out.
    pub fn redirect(&self) -> Option<collabgate_auth::Redirect> {
        match self {
            CollabError::Api(e) => e.redirect(),
            CollabError::Auth(AuthError::Api(e)) => e.redirect(),
            _ => None,
        }
    }
}
