//! Room configuration: which server, which room name, which password.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ChannelAddress, RoomError, RoomId};

/// Where the collaboration server lives and how rooms are named on it.
///
/// The facade crate fills this from the environment; the defaults match a
/// local development server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Base WebSocket address of the collaboration server.
    pub ws_host: Url,

    /// Room name used when the caller only knows a document id.
    pub default_room: String,

    /// Password for private rooms. `None` for public rooms.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            ws_host: Url::parse("ws://127.0.0.1:1234")
                .expect("valid default URL"),
            default_room: "filecollab".to_string(),
            password: None,
        }
    }
}

impl RoomConfig {
    /// The room for `document_id` under the default room name.
    pub fn room_for(&self, document_id: impl Into<String>) -> RoomId {
        RoomId::new(self.default_room.clone(), document_id)
    }

    /// The channel address of `room`, using `password` if given and the
    /// configured password otherwise.
    pub fn address(
        &self,
        room: &RoomId,
        password: Option<&str>,
    ) -> Result<ChannelAddress, RoomError> {
        let password = password.or(self.password.as_deref());
        ChannelAddress::new(&self.ws_host, room, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.ws_host.as_str(), "ws://127.0.0.1:1234/");
        assert_eq!(config.default_room, "filecollab");
        assert!(config.password.is_none());
    }

    #[test]
    fn test_room_for_uses_default_room_name() {
        let config = RoomConfig::default();
        assert_eq!(config.room_for("abc").key(), "filecollab-abc");
    }

    #[test]
    fn test_address_prefers_explicit_password() {
        let config = RoomConfig {
            password: Some("from-config".into()),
            ..Default::default()
        };
        let room = config.room_for("abc");

        let explicit = config.address(&room, Some("explicit")).unwrap();
        assert_eq!(explicit.password(), Some("explicit"));

        let fallback = config.address(&room, None).unwrap();
        assert_eq!(fallback.password(), Some("from-config"));
    }

    #[test]
    fn test_room_config_never_serializes_password() {
        let config = RoomConfig {
            password: Some("s3cret".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
    }
}
