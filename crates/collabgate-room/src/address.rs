//! Room identifiers and channel addresses.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::RoomError;

/// Separator between the room name and the document id in a room key.
const KEY_SEPARATOR: char = '-';

/// Name of the connection parameter that carries a private room's password.
pub const PASSWORD_PARAM: &str = "password";

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// The canonical identity of one collaboration channel.
///
/// Two `RoomId`s are equal exactly when they produce the same key, so the
/// type can be used directly as a map key by the session layer. The key is
/// stable: reconnecting to the same document always targets the same
/// channel. `("a-b", "c")` and `("a", "b-c")` name the same channel and
/// compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomId {
    room_name: String,
    document_id: String,
}

impl RoomId {
    /// Creates a room identifier for `document_id` inside `room_name`.
    pub fn new(
        room_name: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            room_name: room_name.into(),
            document_id: document_id.into(),
        }
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Returns the channel key, `"<roomName>-<documentId>"`.
    ///
    /// For a fixed room name the key is injective in the document id: the
    /// document id is always the suffix after the room name and separator.
    pub fn key(&self) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.room_name, self.document_id)
    }
}

impl PartialEq for RoomId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RoomId {}

impl Hash for RoomId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.room_name, self.document_id)
    }
}

// ---------------------------------------------------------------------------
// ChannelAddress
// ---------------------------------------------------------------------------

/// Where to open a room's channel: `ws(s)://<host>:<port>/<roomKey>`.
///
/// The password of a private room is NOT part of the path. It travels as a
/// connection parameter (see [`connect_url`](Self::connect_url)) and is
/// redacted from `Debug` and `Display` output so it never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelAddress {
    url: Url,
    password: Option<String>,
}

impl ChannelAddress {
    /// Builds the address of `room` on the collaboration server at `host`.
    ///
    /// # Errors
    /// - [`RoomError::UnsupportedScheme`] if `host` is not `ws` or `wss`
    /// - [`RoomError::NotABase`] if `host` cannot carry a path
    pub fn new(
        host: &Url,
        room: &RoomId,
        password: Option<&str>,
    ) -> Result<Self, RoomError> {
        match host.scheme() {
            "ws" | "wss" => {}
            other => return Err(RoomError::UnsupportedScheme(other.into())),
        }

        let mut url = host.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| RoomError::NotABase(host.to_string()))?
            .pop_if_empty()
            .push(&room.key());

        Ok(Self {
            url,
            password: password.map(str::to_owned),
        })
    }

    /// Parses `host` and builds the address in one step.
    pub fn parse(
        host: &str,
        room: &RoomId,
        password: Option<&str>,
    ) -> Result<Self, RoomError> {
        let host = Url::parse(host)
            .map_err(|e| RoomError::InvalidHost(host.to_string(), e))?;
        Self::new(&host, room, password)
    }

    /// The channel address without any connection parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether this is a password-protected (private) room.
    pub fn is_private(&self) -> bool {
        self.password.is_some()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The URL to actually dial: the channel address plus the password
    /// parameter for private rooms.
    pub fn connect_url(&self) -> Url {
        let mut url = self.url.clone();
        if let Some(password) = &self.password {
            url.query_pairs_mut().append_pair(PASSWORD_PARAM, password);
        }
        url
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl fmt::Debug for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelAddress")
            .field("url", &self.url.as_str())
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> Url {
        Url::parse("ws://127.0.0.1:1234").unwrap()
    }

    // =====================================================================
    // RoomId
    // =====================================================================

    #[test]
    fn test_key_joins_room_and_document_with_dash() {
        let room = RoomId::new("filecollab", "8aee99ec");
        assert_eq!(room.key(), "filecollab-8aee99ec");
        assert_eq!(room.to_string(), room.key());
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = RoomId::new("filecollab", "doc-1");
        let b = RoomId::new("filecollab", "doc-1");
        assert_eq!(a.key(), b.key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinct_documents_never_collide() {
        // Document ids that themselves contain the separator must still
        // map to distinct keys under the same room name.
        let ids = ["1", "2", "1-2", "12", "-", "", "a-b-c", "a-b"];
        let mut keys: Vec<String> = ids
            .iter()
            .map(|id| RoomId::new("filecollab", *id).key())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ids.len());
    }

    #[test]
    fn test_eq_follows_key_not_parts() {
        use std::collections::HashSet;

        let a = RoomId::new("a-b", "c");
        let b = RoomId::new("a", "b-c");
        assert_eq!(a.key(), b.key());
        assert_eq!(a, b);
        assert_eq!(HashSet::from([a, b]).len(), 1);
        assert_ne!(RoomId::new("a", "bc"), RoomId::new("ab", "c"));
    }

    #[test]
    fn test_accessors_return_parts() {
        let room = RoomId::new("r", "d");
        assert_eq!(room.room_name(), "r");
        assert_eq!(room.document_id(), "d");
    }

    // =====================================================================
    // ChannelAddress
    // =====================================================================

    #[test]
    fn test_address_appends_room_key_as_path() {
        let room = RoomId::new("filecollab", "42");
        let addr = ChannelAddress::new(&host(), &room, None).unwrap();
        assert_eq!(addr.url().as_str(), "ws://127.0.0.1:1234/filecollab-42");
        assert!(!addr.is_private());
        assert_eq!(addr.connect_url(), *addr.url());
    }

    #[test]
    fn test_address_keeps_host_path_prefix() {
        let host = Url::parse("wss://collab.example.com/sync/").unwrap();
        let room = RoomId::new("filecollab", "42");
        let addr = ChannelAddress::new(&host, &room, None).unwrap();
        assert_eq!(
            addr.url().as_str(),
            "wss://collab.example.com/sync/filecollab-42"
        );
    }

    #[test]
    fn test_address_password_is_a_parameter_not_a_path() {
        let room = RoomId::new("filecollab", "42");
        let addr =
            ChannelAddress::new(&host(), &room, Some("s3cret")).unwrap();

        assert!(addr.is_private());
        assert_eq!(addr.url().path(), "/filecollab-42");
        assert_eq!(
            addr.connect_url().as_str(),
            "ws://127.0.0.1:1234/filecollab-42?password=s3cret"
        );
    }

    #[test]
    fn test_address_redacts_password_in_debug_and_display() {
        let room = RoomId::new("filecollab", "42");
        let addr =
            ChannelAddress::new(&host(), &room, Some("s3cret")).unwrap();
        assert!(!format!("{addr:?}").contains("s3cret"));
        assert!(!addr.to_string().contains("s3cret"));
    }

    #[test]
    fn test_address_rejects_http_scheme() {
        let host = Url::parse("http://127.0.0.1:1234").unwrap();
        let room = RoomId::new("filecollab", "42");
        let result = ChannelAddress::new(&host, &room, None);
        assert!(
            matches!(result, Err(RoomError::UnsupportedScheme(s)) if s == "http")
        );
    }

    #[test]
    fn test_parse_rejects_garbage_host() {
        let room = RoomId::new("filecollab", "42");
        let result = ChannelAddress::parse("not a url", &room, None);
        assert!(matches!(result, Err(RoomError::InvalidHost(..))));
    }
}
