use std::collections::HashMap;

use async_trait::async_trait;
use etn_core::{NewSharedImage, SharedImage, StoreBackend};
use tokio::sync::RwLock;

use crate::keys::{generate_document_id, is_valid_document_id, validate_collection};
use crate::traits::{DocumentStore, StoreResult};

/// In-process document store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<(String, String), SharedImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, document: &NewSharedImage) -> StoreResult<String> {
        validate_collection(collection)?;

        let mut documents = self.documents.write().await;
        let id = loop {
            let candidate = generate_document_id();
            if !documents.contains_key(&(collection.to_string(), candidate.clone())) {
                break candidate;
            }
        };

        let image = document.clone().into_shared_image(id.clone());
        documents.insert((collection.to_string(), id.clone()), image);
        tracing::debug!(collection = %collection, document_id = %id, "Document created in memory store");
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<SharedImage>> {
        validate_collection(collection)?;
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etn_core::UploadFile;

    const COLLECTION: &str = "artifacts/test/public/data/shared_images";

    fn document(name: &str) -> NewSharedImage {
        NewSharedImage::from_upload(&UploadFile::new(name, "image/png", b"pixels".to_vec()), None)
    }

    #[tokio::test]
    async fn test_memory_store_create_and_get() {
        let store = MemoryStore::new();
        let id = store.create(COLLECTION, &document("cat.png")).await.unwrap();

        let fetched = store.get_by_id(COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.filename, "cat.png");
        assert_eq!(fetched.decode().unwrap(), b"pixels");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_store_missing_document() {
        let store = MemoryStore::new();
        assert!(store.get_by_id(COLLECTION, "doesnotexist").await.unwrap().is_none());
        assert!(store.get_by_id(COLLECTION, "../escape").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_each_create_gets_new_id() {
        let store = MemoryStore::new();
        let a = store.create(COLLECTION, &document("a.png")).await.unwrap();
        let b = store.create(COLLECTION, &document("a.png")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_memory_store_collections_are_isolated() {
        let store = MemoryStore::new();
        let id = store.create(COLLECTION, &document("a.png")).await.unwrap();
        let other = "artifacts/other/public/data/shared_images";
        assert!(store.get_by_id(other, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_document_path_as_collection() {
        let store = MemoryStore::new();
        assert!(store.create("artifacts/test", &document("a.png")).await.is_err());
    }
}
