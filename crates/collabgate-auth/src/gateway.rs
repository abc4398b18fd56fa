//! The Request Gateway: every REST call goes through here.
//!
//! Outbound, it attaches `Authorization: Bearer <token>` when a token is
//! present. Inbound, it classifies failures:
//!
//! | Response                       | Effect                       | Error                                  |
//! |--------------------------------|------------------------------|----------------------------------------|
//! | none (network failure)         | none                         | [`ApiError::Network`]                  |
//! | 401/403 with a share token     | none                         | [`ApiError::ShareTokenRejected`]       |
//! | 401                            | credentials cleared          | [`ApiError::AuthorizationExpired`]     |
//! | any other non-2xx              | none                         | [`ApiError::Status`]                   |

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{ApiError, ApiRequest, ApiResponse, AuthContext, HttpClient};

/// A navigation target the client should move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The sign-in page.
    Login,
    /// The landing page for signed-in users.
    Home,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::Home => "/",
        }
    }
}

/// Wraps an [`HttpClient`] with bearer injection and global 401 handling.
pub struct RequestGateway<H: HttpClient> {
    http: H,
    auth: Arc<AuthContext>,
}

impl<H: HttpClient> RequestGateway<H> {
    pub fn new(http: H, auth: Arc<AuthContext>) -> Self {
        Self { http, auth }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// Sends `request` and returns the 2xx response.
    ///
    /// # Errors
    /// See the module docs for how each failure is classified. A 401 on a
    /// request without a share token clears the credentials before the
    /// error is returned.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.auth.token() {
            request.headers.push(("Authorization".into(), token.bearer()));
        }

        let method = request.method;
        let path = request.path.clone();
        let shared = request.is_shared();

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, %path, error = %e, "request got no response");
                return Err(ApiError::Network(e));
            }
        };

        if response.is_success() {
            tracing::trace!(%method, %path, status = response.status, "request ok");
            return Ok(response);
        }

        let status = response.status;
        let detail = response.detail();
        match status {
            401 | 403 if shared => {
                tracing::debug!(%method, %path, status, "share token rejected");
                Err(ApiError::ShareTokenRejected { status, detail })
            }
            401 => {
                self.auth.clear();
                tracing::info!(%method, %path, "authorization expired, credentials cleared");
                Err(ApiError::AuthorizationExpired {
                    redirect: Redirect::Login,
                    detail,
                })
            }
            _ => {
                tracing::debug!(%method, %path, status, "request failed");
                Err(ApiError::Status { status, detail })
            }
        }
    }

    /// [`send`](Self::send) and decode the JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response.json().map_err(ApiError::Decode)
    }

    /// [`send`](Self::send) and discard the body.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }
}
