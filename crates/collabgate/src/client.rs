//! `CollabClient`: everything a collaborative editor needs, wired once.
//!
//! One process gets one client. It owns the shared [`AuthContext`], the
//! gateway every REST call goes through, the auth store, the route guard,
//! and the session manager for collaboration channels.

use std::sync::Arc;

use collabgate_auth::{
    AuthContext, AuthStore, FileTokenStorage, FilesApi, GuardDecision, HttpClient,
    MemoryTokenStorage, Navigation, ReqwestClient, RequestGateway, RouteGuard, RouteTable,
    TokenStorage,
};
use collabgate_room::RoomId;
use collabgate_session::{CollabStatus, SessionHandle, SessionManager};
use collabgate_transport::{Connector, WebSocketConnector};

use crate::{CollabConfig, CollabError};

/// The assembled client.
///
/// The type parameters exist for tests; production code uses the defaults
/// via [`CollabClient::from_config`].
pub struct CollabClient<H: HttpClient = ReqwestClient, C: Connector = WebSocketConnector> {
    config: CollabConfig,
    auth: Arc<AuthContext>,
    store: AuthStore<H>,
    files: FilesApi<H>,
    guard: RouteGuard,
    sessions: SessionManager<C>,
}

impl CollabClient {
    /// Builds the production client: `reqwest` for REST, WebSocket for
    /// collaboration channels, and file or memory token storage depending
    /// on `COLLAB_TOKEN_PATH`.
    pub fn from_config(config: CollabConfig) -> Result<Self, CollabError> {
        let http = ReqwestClient::new(config.api_url.clone(), config.api_timeout())
            .map_err(collabgate_auth::ApiError::from)?;
        let connector = WebSocketConnector::new();

        let client = match config.token_path.clone() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "persisting token to file");
                Self::with_parts(config, http, connector, FileTokenStorage::new(path))
            }
            None => Self::with_parts(config, http, connector, MemoryTokenStorage::new()),
        };
        Ok(client)
    }

    /// [`CollabConfig::from_env`] then [`from_config`](Self::from_config).
    pub fn from_env() -> Result<Self, CollabError> {
        Self::from_config(CollabConfig::from_env()?)
    }
}

impl<H: HttpClient, C: Connector> CollabClient<H, C> {
    /// Wires a client from explicit parts. The token held by `storage`, if
    /// any, is restored.
    pub fn with_parts(
        config: CollabConfig,
        http: H,
        connector: C,
        storage: impl TokenStorage + 'static,
    ) -> Self {
        let auth = Arc::new(AuthContext::new(storage));
        let gateway = Arc::new(RequestGateway::new(http, Arc::clone(&auth)));
        let store = AuthStore::new(Arc::clone(&gateway));
        let files = FilesApi::new(gateway);
        let guard = RouteGuard::new(RouteTable::app(), Arc::clone(&auth));
        let sessions = SessionManager::new(
            connector,
            config.room_config(),
            config.session_config(),
        );

        tracing::info!(
            ws = %config.ws,
            api = %config.api_url,
            room = %config.room,
            authenticated = auth.is_authenticated(),
            "collab client ready"
        );

        Self {
            config,
            auth,
            store,
            files,
            guard,
            sessions,
        }
    }

    pub fn config(&self) -> &CollabConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn store(&self) -> &AuthStore<H> {
        &self.store
    }

    pub fn files(&self) -> &FilesApi<H> {
        &self.files
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager<C> {
        &mut self.sessions
    }

    /// Checks a navigation target such as `"/files/42?share_token=abc"`.
    pub fn navigate(&self, target: &str) -> GuardDecision {
        self.guard.evaluate(&Navigation::parse(target))
    }

    /// The room a document is edited in.
    pub fn room_for(&self, document_id: &str) -> RoomId {
        self.sessions.room_config().room_for(document_id)
    }

    /// Opens the collaboration channel for `document_id` in the configured
    /// room, with the configured password.
    ///
    /// # Errors
    /// See [`SessionManager::open`].
    pub fn open_document(&mut self, document_id: &str) -> Result<SessionHandle, CollabError> {
        let handle = self.sessions.open_document(document_id, None)?;
        Ok(handle.clone())
    }

    pub fn document_status(&self, document_id: &str) -> CollabStatus {
        self.sessions.status(&self.room_for(document_id))
    }

    /// Closes the channel for `document_id`. No-op if it isn't open.
    pub async fn close_document(&mut self, document_id: &str) {
        let room = self.room_for(document_id);
        self.sessions.close(&room).await;
    }

    /// Closes every collaboration channel.
    pub async fn shutdown(&mut self) {
        tracing::info!(sessions = self.sessions.len(), "shutting down");
        self.sessions.close_all().await;
    }
}
