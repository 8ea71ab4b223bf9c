//! Identity and document store setup

use etn_core::Config;
use etn_services::Backend;
use etn_store::{create_identity, create_store};
use std::sync::Arc;

use crate::state::IdentityStatus;

/// Result of backend initialization. `backend` is `None` when the store could not
/// be created; the uploader and viewer then report the service as unavailable.
pub struct BackendSetup {
    pub backend: Option<Arc<Backend>>,
    pub identity: IdentityStatus,
}

/// Sign in, then connect the document store with the resulting session.
///
/// Never fails: a rejected sign-in degrades uploads to anonymous attribution, and
/// an unusable store configuration (such as a placeholder Firebase project) leaves
/// the service without a backend.
pub async fn setup_backend(config: &Config) -> BackendSetup {
    tracing::info!("Initializing identity provider...");
    let identity = match create_identity(config) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Identity provider unavailable; running without a backend");
            return BackendSetup {
                backend: None,
                identity: IdentityStatus::Unavailable,
            };
        }
    };

    let (session, identity_status) = match identity.sign_in().await {
        Ok(session) => {
            tracing::info!(
                provider = identity.provider_name(),
                user_id = %session.user_id,
                anonymous = session.anonymous,
                "Signed in"
            );
            (Some(session), IdentityStatus::SignedIn)
        }
        Err(e) => {
            tracing::warn!(
                provider = identity.provider_name(),
                error = %e,
                "Sign-in failed; uploads will be attributed to anonymous"
            );
            (None, IdentityStatus::Anonymous)
        }
    };

    tracing::info!("Initializing document store...");
    let store = match create_store(config, session.as_ref()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Document store unavailable; running without a backend");
            return BackendSetup {
                backend: None,
                identity: identity_status,
            };
        }
    };

    let collection = config.collection_path();
    tracing::info!(
        backend = %store.backend_type(),
        collection = %collection,
        "Document store initialized successfully"
    );

    BackendSetup {
        backend: Some(Arc::new(Backend::new(store, session, collection))),
        identity: identity_status,
    }
}
