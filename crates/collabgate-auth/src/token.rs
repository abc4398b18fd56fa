//! Opaque credentials. Their contents never show up in logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A bearer token issued by the login endpoint.
///
/// Opaque: it is never decoded or checked for expiry locally. The server
/// decides whether it is still valid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// A per-document share token that grants read access to one file
/// without signing in.
///
/// Independent of [`Token`]: presenting one never changes the auth state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(Token::new("abc").bearer(), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts_contents() {
        assert_eq!(format!("{:?}", Token::new("secret")), "Token(***)");
        assert_eq!(
            format!("{:?}", ShareToken::new("secret")),
            "ShareToken(***)"
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Token::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
