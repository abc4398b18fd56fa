//! Process configuration from the environment.
//!
//! Every setting is a `COLLAB_`-prefixed variable. A `.env` file in the
//! working directory is read first; real environment variables win.

use std::path::PathBuf;
use std::time::Duration;

use collabgate_room::RoomConfig;
use collabgate_session::SessionConfig;
use serde::Deserialize;
use url::Url;

/// Variable prefix, e.g. `COLLAB_WS`.
pub const ENV_PREFIX: &str = "COLLAB_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a [`CollabClient`](crate::CollabClient) needs to start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollabConfig {
    /// `COLLAB_WS`: collaboration server base address.
    pub ws: Url,
    /// `COLLAB_ROOM`: room name used for documents.
    pub room: String,
    /// `COLLAB_PASSWORD`: room password, unset for public rooms.
    pub password: Option<String>,
    pub connection_timeout_ms: u64,
    pub reconnect_interval_ms: u64,
    pub max_reconnect_attempts: u32,
    /// `COLLAB_API_URL`: REST base, including the version prefix.
    pub api_url: Url,
    pub api_timeout_ms: u64,
    /// `COLLAB_TOKEN_PATH`: where the token is persisted. Unset keeps it in
    /// memory only.
    pub token_path: Option<PathBuf>,
    /// `COLLAB_LOG`: tracing filter directive.
    pub log: String,
}

impl Default for CollabConfig {
    fn default() -> Self {
        let rooms = RoomConfig::default();
        let session = SessionConfig::default();
        Self {
            ws: rooms.ws_host,
            room: rooms.default_room,
            password: None,
            connection_timeout_ms: session.connection_timeout.as_millis() as u64,
            reconnect_interval_ms: session.reconnect_interval.as_millis() as u64,
            max_reconnect_attempts: session.max_reconnect_attempts,
            api_url: Url::parse("http://127.0.0.1:8000/api/v1").expect("valid default URL"),
            api_timeout_ms: 10_000,
            token_path: None,
            log: "info".into(),
        }
    }
}

impl CollabConfig {
    /// Loads `.env` (if present), then reads `COLLAB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        let config = envy::prefixed(ENV_PREFIX).from_env::<Self>()?;
        config.validate()
    }

    /// Reads configuration from explicit `(name, value)` pairs, with names
    /// still carrying the `COLLAB_` prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !matches!(self.ws.scheme(), "ws" | "wss") {
            return Err(ConfigError::Invalid(format!(
                "COLLAB_WS must be a ws:// or wss:// URL, got {}",
                self.ws
            )));
        }
        if !matches!(self.api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "COLLAB_API_URL must be an http(s) URL, got {}",
                self.api_url
            )));
        }
        if self.room.is_empty() {
            return Err(ConfigError::Invalid("COLLAB_ROOM must not be empty".into()));
        }
        if self.connection_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "COLLAB_CONNECTION_TIMEOUT_MS must be positive".into(),
            ));
        }
        Ok(self)
    }

    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            ws_host: self.ws.clone(),
            default_room: self.room.clone(),
            password: self.password.clone().filter(|p| !p.is_empty()),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connection_timeout: Duration::from_millis(self.connection_timeout_ms),
            reconnect_interval: Duration::from_millis(self.reconnect_interval_ms),
            max_reconnect_attempts: self.max_reconnect_attempts,
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }
}
