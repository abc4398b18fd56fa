//! Typed wrappers over the REST endpoints.
//!
//! Both go through the shared [`RequestGateway`], so the bearer token and
//! 401 handling apply to every call.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    AccessToken, ApiError, ApiRequest, FileRecord, FileUpdate, HttpClient, NewFile,
    NewUser, PublicFile, RequestGateway, ShareGrant, ShareToken, UserProfile,
};

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

/// Login, signup, and the current user.
pub struct AuthApi<H: HttpClient> {
    gateway: Arc<RequestGateway<H>>,
}

impl<H: HttpClient> AuthApi<H> {
    pub fn new(gateway: Arc<RequestGateway<H>>) -> Self {
        Self { gateway }
    }

    /// Exchanges credentials for a token (OAuth2 password form).
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let request = ApiRequest::post("/login/access-token")
            .form([("username", email), ("password", password)]);
        self.gateway.send_json(request).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::post("/users/signup").json(to_json(user)?);
        self.gateway.send_json(request).await
    }

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.gateway.send_json(ApiRequest::get("/users/me")).await
    }
}

impl<H: HttpClient> Clone for AuthApi<H> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

/// File CRUD, share token issuance, and shared reads.
pub struct FilesApi<H: HttpClient> {
    gateway: Arc<RequestGateway<H>>,
}

impl<H: HttpClient> FilesApi<H> {
    pub fn new(gateway: Arc<RequestGateway<H>>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<FileRecord>, ApiError> {
        self.gateway.send_json(ApiRequest::get("/files/")).await
    }

    pub async fn get(&self, file_id: &str) -> Result<FileRecord, ApiError> {
        self.gateway
            .send_json(ApiRequest::get(format!("/files/{file_id}")))
            .await
    }

    pub async fn create(&self, file: &NewFile) -> Result<FileRecord, ApiError> {
        let request = ApiRequest::post("/files/").json(to_json(file)?);
        self.gateway.send_json(request).await
    }

    pub async fn update(&self, file_id: &str, update: &FileUpdate) -> Result<FileRecord, ApiError> {
        let request = ApiRequest::put(format!("/files/{file_id}")).json(to_json(update)?);
        self.gateway.send_json(request).await
    }

    pub async fn delete(&self, file_id: &str) -> Result<(), ApiError> {
        self.gateway
            .send_empty(ApiRequest::delete(format!("/files/{file_id}")))
            .await
    }

    /// Issues a share token for a file the caller owns. The server default
    /// lifetime applies when `expires_hours` is `None`.
    pub async fn create_share_token(
        &self,
        file_id: &str,
        expires_hours: Option<u32>,
    ) -> Result<ShareGrant, ApiError> {
        let mut request = ApiRequest::post(format!("/files/{file_id}/share"));
        if let Some(hours) = expires_hours {
            request = request.form([("expires_hours", hours.to_string())]);
        }
        self.gateway.send_json(request).await
    }

    /// Reads a file with a share token. A bad token is
    /// [`ApiError::ShareTokenRejected`] and leaves the auth state alone.
    pub async fn public_file(&self, file_id: &str, token: &ShareToken) -> Result<PublicFile, ApiError> {
        let request = ApiRequest::get(format!("/public/files/{file_id}")).share_token(token);
        self.gateway.send_json(request).await
    }
}

impl<H: HttpClient> Clone for FilesApi<H> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}
