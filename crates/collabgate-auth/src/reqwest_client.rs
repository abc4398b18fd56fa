//! [`HttpClient`] over `reqwest`.

use std::time::Duration;

use url::Url;

use crate::{ApiRequest, ApiResponse, HttpClient, Method, NetworkError, RequestBody};

/// Talks to the REST backend at `base_url`, e.g.
/// `http://127.0.0.1:8000/api/v1`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestClient {
    /// # Errors
    /// Fails if the TLS backend can't be initialised.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl HttpClient for ReqwestClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, NetworkError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, self.url_for(&request.path))
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError(e.to_string()))?;

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
