use std::sync::Arc;

use etn_core::constants::ANONYMOUS_OWNER_ID;
use etn_store::{DocumentStore, Session};

/// Store client, signed-in session, and target collection, built once at startup
/// and shared by the uploader and viewer.
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn DocumentStore>,
    /// `None` when sign-in failed; uploads are then attributed to `"anonymous"`.
    pub session: Option<Session>,
    pub collection: String,
}

impl Backend {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: Option<Session>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            session,
            collection: collection.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .unwrap_or(ANONYMOUS_OWNER_ID)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("store", &self.store.backend_type())
            .field("session", &self.session.as_ref().map(|s| &s.user_id))
            .field("collection", &self.collection)
            .finish()
    }
}
