//! Application state shared by all handlers.

use etn_core::{Config, StoreBackend};
use etn_services::{Uploader, Viewer};
use serde::Serialize;

/// Outcome of signing in at startup, reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    /// Signed in; uploads carry the session's user id
    SignedIn,
    /// Sign-in failed; uploads are attributed to "anonymous"
    Anonymous,
    /// No identity provider could be created
    Unavailable,
}

pub struct AppState {
    pub config: Config,
    pub uploader: Uploader,
    pub viewer: Viewer,
    /// `None` when no store could be initialized
    pub store_backend: Option<StoreBackend>,
    pub identity: IdentityStatus,
}

impl AppState {
    pub fn is_ready(&self) -> bool {
        self.store_backend.is_some() && self.uploader.is_ready() && self.viewer.is_ready()
    }
}
