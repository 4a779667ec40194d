//! Remote Intercom client
//!
//! The sync service talks to the platform only through the [`IntercomApi`]
//! trait, so tests and alternate transports can stand in for the real REST
//! client.

use crate::error::{Error, Result};
use crate::types::{CompanyRecord, DeleteUser, TagRequest, UserRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Successful response from the platform
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response body as returned by the platform
    pub body: Value,
}

/// Rejection or transport failure from the platform
///
/// `status_code` is `None` when no HTTP response was received at all. The
/// payload is kept raw; [`crate::normalize`] turns it into a typed failure.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,
    /// Raw error payload (JSON or plain text)
    pub payload: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "API error {}: {}", code, self.payload),
            None => write!(f, "API transport error: {}", self.payload),
        }
    }
}

impl std::error::Error for ApiError {}

/// Result of a single remote call
pub type ApiResult = std::result::Result<ApiResponse, ApiError>;

/// Remote Intercom capability
#[async_trait]
pub trait IntercomApi: Send + Sync {
    /// Create a user, or update it when the identity already exists
    async fn create_user(&self, user: &UserRecord) -> ApiResult;

    /// Create a company, or update it when the identity already exists
    async fn create_company(&self, company: &CompanyRecord) -> ApiResult;

    /// Delete a user
    async fn delete_user(&self, params: &DeleteUser) -> ApiResult;

    /// Create a tag and attach it to companies and/or users
    async fn tag(&self, request: &TagRequest) -> ApiResult;
}

/// HTTP implementation of [`IntercomApi`]
pub struct HttpApiClient {
    base_url: String,
    token: String,
    client: Client,
}

impl HttpApiClient {
    /// Create a client authenticating with the given access token
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            token: token.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult {
        debug!("POST {}", path);
        let request = self.client.post(self.url(path)).json(body);
        self.execute(request).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ApiResult {
        let response = request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError {
                status_code: None,
                payload: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError {
            status_code: Some(status.as_u16()),
            payload: e.to_string(),
        })?;

        if status.is_success() {
            // An unparseable success body is kept verbatim rather than dropped.
            let body = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            };
            Ok(ApiResponse { body })
        } else {
            Err(ApiError {
                status_code: Some(status.as_u16()),
                payload: text,
            })
        }
    }
}

#[async_trait]
impl IntercomApi for HttpApiClient {
    async fn create_user(&self, user: &UserRecord) -> ApiResult {
        self.post_json("/users", user).await
    }

    async fn create_company(&self, company: &CompanyRecord) -> ApiResult {
        self.post_json("/companies", company).await
    }

    async fn delete_user(&self, params: &DeleteUser) -> ApiResult {
        debug!("DELETE /users?user_id={}", params.user_id);
        let request = self
            .client
            .delete(self.url("/users"))
            .query(&[("user_id", params.user_id.as_str())]);
        self.execute(request).await
    }

    async fn tag(&self, request: &TagRequest) -> ApiResult {
        self.post_json("/tags", request).await
    }
}
