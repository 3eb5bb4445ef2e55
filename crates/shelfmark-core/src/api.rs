//! API client
//!
//! Thin typed client for the Shelfmark REST API. JSON bodies throughout;
//! authenticated endpoints take a bearer token. Server errors arrive as
//! `{"error": message}` with a non-2xx status and are mapped to
//! `ApiError::Api` carrying the message and status code.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::{
    Collection, CollectionPatch, CreateCollectionRequest, CreateEntryRequest, CreateMediaRequest,
    Entry, EntryPatch, GuestSnapshotRequest, LoginRequest, LoginResponse, MediaItem, MediaType,
    MergeRequest, ShareUrl, Status, User,
};

/// Errors from the API boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the request
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// The request never completed (connection, timeout, decode)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// The HTTP status code, when the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
        }
    }
}

/// Error body shape used by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the Shelfmark API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `https://host/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("shelfmark/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a preconfigured reqwest client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request and decode a JSON response
    #[instrument(skip(self, request))]
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!(%status, %message, "request rejected");
            return Err(ApiError::Api { status, message });
        }

        Ok(response.json::<T>().await?)
    }

    /// Send a request, discarding any response body
    #[instrument(skip(self, request))]
    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!(%status, %message, "request rejected");
            return Err(ApiError::Api { status, message });
        }

        Ok(())
    }

    // ==================== Auth ====================

    pub async fn login(&self, email: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
        };
        self.execute(self.client.post(self.url("/auth/login")).json(&request))
            .await
    }

    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.execute_empty(self.client.post(self.url("/auth/logout")).bearer_auth(token))
            .await
    }

    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.execute(self.client.get(self.url("/auth/me")).bearer_auth(token))
            .await
    }

    // ==================== Media ====================

    pub async fn create_media(
        &self,
        request: &CreateMediaRequest,
        token: &str,
    ) -> Result<MediaItem, ApiError> {
        self.execute(
            self.client
                .post(self.url("/media"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    pub async fn search_media(
        &self,
        query: &str,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let mut params = vec![("q", query.to_string())];
        if let Some(t) = media_type {
            params.push(("type", t.to_string()));
        }
        self.execute(self.client.get(self.url("/media/search")).query(&params))
            .await
    }

    // ==================== Entries ====================

    pub async fn list_entries(
        &self,
        token: &str,
        media_type: Option<MediaType>,
        status: Option<Status>,
    ) -> Result<Vec<Entry>, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(t) = media_type {
            params.push(("type", t.to_string()));
        }
        if let Some(s) = status {
            params.push(("status", s.to_string()));
        }
        self.execute(
            self.client
                .get(self.url("/entries"))
                .query(&params)
                .bearer_auth(token),
        )
        .await
    }

    pub async fn create_entry(
        &self,
        request: &CreateEntryRequest,
        token: &str,
    ) -> Result<Entry, ApiError> {
        self.execute(
            self.client
                .post(self.url("/entries"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    pub async fn get_entry(&self, id: Uuid, token: &str) -> Result<Entry, ApiError> {
        self.execute(
            self.client
                .get(self.url(&format!("/entries/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn update_entry(
        &self,
        id: Uuid,
        patch: &EntryPatch,
        token: &str,
    ) -> Result<Entry, ApiError> {
        self.execute(
            self.client
                .patch(self.url(&format!("/entries/{}", id)))
                .bearer_auth(token)
                .json(patch),
        )
        .await
    }

    pub async fn delete_entry(&self, id: Uuid, token: &str) -> Result<(), ApiError> {
        self.execute_empty(
            self.client
                .delete(self.url(&format!("/entries/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    // ==================== Collections ====================

    pub async fn list_collections(&self, token: &str) -> Result<Vec<Collection>, ApiError> {
        self.execute(self.client.get(self.url("/collections")).bearer_auth(token))
            .await
    }

    pub async fn create_collection(
        &self,
        request: &CreateCollectionRequest,
        token: &str,
    ) -> Result<Collection, ApiError> {
        self.execute(
            self.client
                .post(self.url("/collections"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    pub async fn get_collection(&self, id: Uuid, token: &str) -> Result<Collection, ApiError> {
        self.execute(
            self.client
                .get(self.url(&format!("/collections/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn update_collection(
        &self,
        id: Uuid,
        patch: &CollectionPatch,
        token: &str,
    ) -> Result<Collection, ApiError> {
        self.execute(
            self.client
                .patch(self.url(&format!("/collections/{}", id)))
                .bearer_auth(token)
                .json(patch),
        )
        .await
    }

    pub async fn delete_collection(&self, id: Uuid, token: &str) -> Result<(), ApiError> {
        self.execute_empty(
            self.client
                .delete(self.url(&format!("/collections/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    pub async fn share_collection(&self, id: Uuid, token: &str) -> Result<ShareUrl, ApiError> {
        self.execute(
            self.client
                .post(self.url(&format!("/collections/{}/share", id)))
                .bearer_auth(token),
        )
        .await
    }

    // ==================== Guest ====================

    /// Mint a public read-only share from a guest snapshot (no auth)
    pub async fn create_snapshot(
        &self,
        request: &GuestSnapshotRequest,
    ) -> Result<ShareUrl, ApiError> {
        self.execute(self.client.post(self.url("/guest/snapshot")).json(request))
            .await
    }

    /// Submit the one-shot guest merge
    ///
    /// Success or failure applies to the whole batch, never per-entry.
    pub async fn merge_guest(&self, request: &MergeRequest, token: &str) -> Result<(), ApiError> {
        debug!(entries = request.guest_entries.len(), "submitting merge");
        self.execute_empty(
            self.client
                .post(self.url("/guest/merge"))
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    // ==================== Public ====================

    /// Fetch a public read-only snapshot view
    pub async fn get_share(&self, token: &str) -> Result<serde_json::Value, ApiError> {
        self.execute(self.client.get(self.url(&format!("/s/{}", token))))
            .await
    }
}
