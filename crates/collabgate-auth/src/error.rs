//! Error types for the auth layer.

use crate::gateway::Redirect;

/// The request never produced a response: DNS, refused connection,
/// timeout, or a body that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("network error: {0}")]
pub struct NetworkError(pub String);

/// Errors from a REST call made through the
/// [`RequestGateway`](crate::RequestGateway).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the bearer token. Credentials have been cleared
    /// and the user should be sent to `redirect`.
    #[error("authorization expired, redirecting to {}", redirect.path())]
    AuthorizationExpired {
        redirect: Redirect,
        detail: Option<String>,
    },

    /// No response arrived. Auth state is untouched.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// A share token was missing, invalid, or expired. Auth state is
    /// untouched.
    #[error("share token rejected ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    ShareTokenRejected { status: u16, detail: Option<String> },

    /// Any other non-success status.
    #[error("request failed ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Where to send the user, if this error requires navigation.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            ApiError::AuthorizationExpired { redirect, .. } => Some(*redirect),
            _ => None,
        }
    }

    /// The server's human-readable `detail`, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::AuthorizationExpired { detail, .. }
            | ApiError::ShareTokenRejected { detail, .. }
            | ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthorizationExpired { .. } => Some(401),
            ApiError::ShareTokenRejected { status, .. }
            | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Token persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors from the [`AuthStore`](crate::AuthStore).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The server refused the credentials or registration data. `message`
    /// is what the user should see.
    #[error("{message}")]
    Credential {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
