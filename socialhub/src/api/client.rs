use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::config::ApiSettings;
use crate::logging::SYNC;
use socialhub_types::{RemotePostsResponse, RemoteUser, RemoteUsersResponse};

/// The read-only REST endpoints the client syncs from.
///
/// Every call is a single attempt; callers decide whether a failure is fatal.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// `GET /users?limit=N`
    async fn get_users(&self, limit: u32) -> ApiResult<RemoteUsersResponse>;

    /// `GET /users/search?q=<query>`
    async fn search_users(&self, query: &str) -> ApiResult<RemoteUsersResponse>;

    /// `GET /users/{id}`
    async fn get_user(&self, user_id: i64) -> ApiResult<RemoteUser>;

    /// `GET /posts?limit=N`
    async fn get_posts(&self, limit: u32) -> ApiResult<RemotePostsResponse>;

    /// `GET /posts/user/{id}`
    async fn get_posts_by_user(&self, user_id: i64) -> ApiResult<RemotePostsResponse>;
}

/// HTTP implementation of [`RemoteApi`]
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Create a client with the configured base URL and request timeout
    pub fn from_settings(settings: &ApiSettings) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(settings.base_url.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        log::debug!(target: SYNC, "GET {}", url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            // Decode from text so malformed bodies surface as serialization errors
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::from_status(status, error_text))
        }
    }
}

#[async_trait]
impl RemoteApi for ApiClient {
    async fn get_users(&self, limit: u32) -> ApiResult<RemoteUsersResponse> {
        self.get_json(&format!("/users?limit={}", limit)).await
    }

    async fn search_users(&self, query: &str) -> ApiResult<RemoteUsersResponse> {
        self.get_json(&search_path(query)).await
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<RemoteUser> {
        self.get_json(&format!("/users/{}", user_id)).await
    }

    async fn get_posts(&self, limit: u32) -> ApiResult<RemotePostsResponse> {
        self.get_json(&format!("/posts?limit={}", limit)).await
    }

    async fn get_posts_by_user(&self, user_id: i64) -> ApiResult<RemotePostsResponse> {
        self.get_json(&format!("/posts/user/{}", user_id)).await
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

fn search_path(query: &str) -> String {
    format!("/users/search?q={}", urlencoding::encode(query))
}
