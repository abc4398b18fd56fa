//! REST payloads.

use serde::{Deserialize, Serialize};

use crate::ShareToken;

/// The signed-in user, as returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Registration data for `POST /users/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Response of `POST /login/access-token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub s3_key: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub original_format: Option<String>,
    #[serde(default)]
    pub quill_content: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewFile {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quill_content: Option<String>,
}

/// Fields left `None` are not changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A freshly issued share token for one file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShareGrant {
    pub share_token: ShareToken,
    pub expires_in_hours: u32,
    pub file_id: String,
    pub filename: String,
}

/// A file read through a share token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicFile {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub original_format: Option<String>,
    #[serde(default)]
    pub quill_content: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_defaults_token_type() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }

    #[test]
    fn test_user_profile_tolerates_missing_optional_fields() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.c"}"#).unwrap();
        assert!(!user.is_superuser);
        assert_eq!(user.full_name, None);
    }

    #[test]
    fn test_file_update_omits_unset_fields() {
        let update = FileUpdate {
            filename: Some("notes.docx".into()),
            ..FileUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "filename": "notes.docx" })
        );
    }

    #[test]
    fn test_share_grant_parses_issuance_response() {
        let grant: ShareGrant = serde_json::from_str(
            r#"{"share_token":"st","expires_in_hours":4,"file_id":"f1","filename":"a.docx"}"#,
        )
        .unwrap();
        assert_eq!(grant.share_token.as_str(), "st");
        assert_eq!(grant.expires_in_hours, 4);
    }
}
