#[cfg(feature = "store-firestore")]
use crate::{FirebaseIdentity, FirestoreStore, TokenRefresher};
#[cfg(feature = "store-local")]
use crate::LocalStore;
use crate::{
    DocumentStore, IdentityProvider, LocalAnonymousIdentity, MemoryStore, Session, StoreBackend,
    StoreError, StoreResult,
};
use etn_core::Config;
use std::sync::Arc;

/// Create a document store based on configuration.
///
/// `session` supplies the bearer token for backends that authorize requests.
pub async fn create_store(
    config: &Config,
    session: Option<&Session>,
) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),

        #[cfg(feature = "store-local")]
        StoreBackend::Local => {
            let store = LocalStore::new(&config.store.local_store_path).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-local"))]
        StoreBackend::Local => Err(StoreError::ConfigError(
            "Local store backend not available (store-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-firestore")]
        StoreBackend::Firestore => {
            let project_id = firebase_project_id(config)?;
            let id_token = session.and_then(|s| s.id_token.clone());
            let mut store = FirestoreStore::new(
                config.store.firestore_base_url.clone(),
                project_id,
                id_token,
            )?;

            let refresh = session.and_then(|s| s.refresh_token.clone().map(|t| (t, s.expires_at)));
            if let (Some((refresh_token, expires_at)), Some(api_key)) =
                (refresh, config.store.firebase_api_key.as_deref())
            {
                let refresher =
                    TokenRefresher::new(config.store.secure_token_base_url.clone(), api_key)?;
                store = store.with_token_refresh(refresher, refresh_token, expires_at);
            }
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-firestore"))]
        StoreBackend::Firestore => {
            let _ = session;
            Err(StoreError::ConfigError(
                "Firestore backend not available (store-firestore feature not enabled)".to_string(),
            ))
        }
    }
}

/// Create the identity provider matching the configured store backend.
pub fn create_identity(config: &Config) -> StoreResult<Arc<dyn IdentityProvider>> {
    match config.store.backend {
        StoreBackend::Memory | StoreBackend::Local => Ok(Arc::new(LocalAnonymousIdentity::new())),

        #[cfg(feature = "store-firestore")]
        StoreBackend::Firestore => {
            firebase_project_id(config)?;
            let api_key = config.store.firebase_api_key.clone().ok_or_else(|| {
                StoreError::ConfigError("FIREBASE_API_KEY not configured".to_string())
            })?;
            let identity = FirebaseIdentity::new(
                config.store.identity_toolkit_base_url.clone(),
                api_key,
                config.store.firebase_auth_token.clone(),
            )
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;
            Ok(Arc::new(identity))
        }

        #[cfg(not(feature = "store-firestore"))]
        StoreBackend::Firestore => Err(StoreError::ConfigError(
            "Firestore backend not available (store-firestore feature not enabled)".to_string(),
        )),
    }
}

#[cfg(feature = "store-firestore")]
fn firebase_project_id(config: &Config) -> StoreResult<String> {
    if config.firebase_is_placeholder() {
        return Err(StoreError::ConfigError(
            "FIREBASE_PROJECT_ID not configured".to_string(),
        ));
    }
    config
        .store
        .firebase_project_id
        .clone()
        .ok_or_else(|| StoreError::ConfigError("FIREBASE_PROJECT_ID not configured".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let config = config(&[("STORE_BACKEND", "memory")]);
        let store = create_store(&config, None).await.unwrap();
        assert_eq!(store.backend_type(), StoreBackend::Memory);
        assert_eq!(create_identity(&config).unwrap().provider_name(), "local-anonymous");
    }

    #[cfg(feature = "store-local")]
    #[tokio::test]
    async fn test_local_backend_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let config = config(&[
            ("STORE_BACKEND", "local"),
            ("LOCAL_STORE_PATH", root.to_str().unwrap()),
        ]);
        let store = create_store(&config, None).await.unwrap();
        assert_eq!(store.backend_type(), StoreBackend::Local);
        assert!(root.is_dir());
    }

    #[cfg(feature = "store-firestore")]
    #[tokio::test]
    async fn test_placeholder_project_is_not_a_backend() {
        let config = config(&[
            ("STORE_BACKEND", "firestore"),
            ("FIREBASE_PROJECT_ID", "YOUR_FIREBASE_PROJECT_ID"),
        ]);
        assert!(matches!(
            create_store(&config, None).await,
            Err(StoreError::ConfigError(_))
        ));
        assert!(create_identity(&config).is_err());
    }

    #[cfg(feature = "store-firestore")]
    #[tokio::test]
    async fn test_firestore_backend() {
        let config = config(&[
            ("STORE_BACKEND", "firestore"),
            ("FIREBASE_PROJECT_ID", "etn-test"),
            ("FIREBASE_API_KEY", "api-key"),
        ]);
        let session = Session {
            user_id: "uid".to_string(),
            id_token: Some("token".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
            anonymous: true,
        };
        let store = create_store(&config, Some(&session)).await.unwrap();
        assert_eq!(store.backend_type(), StoreBackend::Firestore);
        assert_eq!(create_identity(&config).unwrap().provider_name(), "firebase");
    }
}
