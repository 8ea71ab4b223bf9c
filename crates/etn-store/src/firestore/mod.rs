//! Firestore REST backend and Firebase identity
//!
//! Talks to the Firestore v1 REST API directly with `reqwest`. Base URLs are
//! configurable so tests can point the client at a local mock server.

mod auth;
mod fields;
mod token;

pub use auth::FirebaseIdentity;
pub use token::TokenRefresher;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use etn_core::models::truncate_chars;
use etn_core::{NewSharedImage, SharedImage, StoreBackend};
use reqwest::StatusCode;

use crate::keys::{is_valid_document_id, validate_collection};
use crate::traits::{DocumentStore, StoreError, StoreResult};
use fields::{from_read_document, to_write_document, ReadDocument};
use token::AuthToken;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_MAX_CHARS: usize = 200;

/// Firestore document store
pub struct FirestoreStore {
    http_client: reqwest::Client,
    base_url: String,
    project_id: String,
    auth: Option<AuthToken>,
}

impl FirestoreStore {
    /// Create a store for `project_id`.
    ///
    /// `id_token` is sent as a bearer token when present; without it requests are
    /// subject to the project's unauthenticated security rules.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        id_token: Option<String>,
    ) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            auth: id_token.map(AuthToken::fixed),
        })
    }

    /// Keep the id token valid by exchanging `refresh_token` near `expires_at`,
    /// or when Firestore answers 401. Has no effect without an id token.
    pub fn with_token_refresh(
        mut self,
        refresher: TokenRefresher,
        refresh_token: String,
        expires_at: Option<Instant>,
    ) -> Self {
        self.auth = self
            .auth
            .take()
            .map(|auth| auth.with_refresher(refresher, refresh_token, expires_at));
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), urlencoding::encode(id))
    }

    /// Send an authorized request, retrying once with a refreshed token on 401.
    async fn send<F>(&self, build: F) -> StoreResult<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let Some(auth) = &self.auth else {
            return build(&self.http_client).send().await.map_err(transport_error);
        };

        let token = auth.current().await?;
        let response = build(&self.http_client)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::UNAUTHORIZED || !auth.can_refresh() {
            return Ok(response);
        }

        tracing::info!("Firestore rejected the id token, refreshing");
        let token = auth.refresh(&token).await?;
        build(&self.http_client)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)
    }
}

/// Map a non-success response to a store error. Throttling and server errors are
/// transient; other client errors are not.
pub(crate) async fn error_from_response(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = format!("{} - {}", status, truncate_chars(body.trim(), ERROR_BODY_MAX_CHARS));

    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        StoreError::Transient(message)
    } else {
        StoreError::Permanent(message)
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(&self, collection: &str, document: &NewSharedImage) -> StoreResult<String> {
        validate_collection(collection)?;

        let url = self.collection_url(collection);
        let body = to_write_document(document);
        let response = self
            .send(|client| client.post(url.as_str()).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: ReadDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to parse create response: {}", e)))?;
        let id = created.id().to_string();

        tracing::debug!(collection = %collection, document_id = %id, "Document created in Firestore");
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<SharedImage>> {
        validate_collection(collection)?;
        if !is_valid_document_id(id) {
            return Ok(None);
        }

        let url = self.document_url(collection, id);
        let response = self.send(|client| client.get(url.as_str())).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let document: ReadDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to parse document: {}", e)))?;
        from_read_document(document).map(Some)
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Firestore
    }
}
