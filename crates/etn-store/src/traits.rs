//! Store abstraction traits
//!
//! This module defines the document store and identity traits every backend implements.

use std::time::Instant;

use async_trait::async_trait;
use etn_core::{NewSharedImage, SharedImage, StoreBackend};
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transient store failure: {0}")]
    Transient(String),

    #[error("Store rejected request: {0}")]
    Permanent(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid document path: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether a write that failed this way may succeed if attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Transient(_) | StoreError::Transport(_) | StoreError::IoError(_)
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store abstraction
///
/// Backends provide exactly two operations over a collection of shared images.
/// `create` is all-or-nothing: on error no document exists.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return the id the store assigned to it
    async fn create(&self, collection: &str, document: &NewSharedImage) -> StoreResult<String>;

    /// Fetch a document by id; `Ok(None)` when no such document exists
    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<SharedImage>>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}

/// Identity issued by an `IdentityProvider`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    /// Bearer token for backends that authorize requests with it.
    pub id_token: Option<String>,
    /// Exchanged for a new `id_token` once it expires.
    pub refresh_token: Option<String>,
    pub expires_at: Option<Instant>,
    pub anonymous: bool,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Issues the session used to attribute uploads. Resolved once at startup.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<Session, IdentityError>;

    fn provider_name(&self) -> &'static str;
}
