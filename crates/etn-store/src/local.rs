use std::path::{Path, PathBuf};

use async_trait::async_trait;
use etn_core::{NewSharedImage, SharedImage, StoreBackend};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::keys::{generate_document_id, is_valid_document_id, validate_collection};
use crate::traits::{DocumentStore, StoreError, StoreResult};

const MAX_ID_COLLISION_RETRIES: usize = 3;

/// Local filesystem document store
///
/// Each document is one JSON file at `{base_path}/{collection}/{id}.json`. Files are
/// written to a temporary sibling and renamed into place, so a reader never sees a
/// partially written document.
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path` (e.g. "/var/lib/etn/data")
    pub async fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(path = %base_path.display(), "Local document store initialized");

        Ok(LocalStore { base_path })
    }

    fn collection_dir(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_collection(collection)?;
        Ok(self.base_path.join(collection))
    }

    fn document_path(dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("{}.json", id))
    }

    async fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).await?;
        if let Err(e) = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await
        {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn create(&self, collection: &str, document: &NewSharedImage) -> StoreResult<String> {
        let dir = self.collection_dir(collection)?;
        fs::create_dir_all(&dir).await?;

        let mut attempts = 0;
        let (id, path) = loop {
            let id = generate_document_id();
            let path = Self::document_path(&dir, &id);
            if !fs::try_exists(&path).await? {
                break (id, path);
            }
            attempts += 1;
            if attempts >= MAX_ID_COLLISION_RETRIES {
                return Err(StoreError::Transient(
                    "Could not allocate a unique document id".to_string(),
                ));
            }
        };

        let image = document.clone().into_shared_image(id.clone());
        let bytes = serde_json::to_vec(&image)?;
        Self::write_atomically(&path, &bytes).await?;

        tracing::debug!(
            collection = %collection,
            document_id = %id,
            size = bytes.len(),
            "Document written to local store"
        );
        Ok(id)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<SharedImage>> {
        let dir = self.collection_dir(collection)?;
        if !is_valid_document_id(id) {
            tracing::debug!(document_id = %id, "Rejected malformed document id");
            return Ok(None);
        }

        let path = Self::document_path(&dir, id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let image: SharedImage = serde_json::from_slice(&bytes)?;
        Ok(Some(image))
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etn_core::UploadFile;
    use tempfile::tempdir;

    const COLLECTION: &str = "artifacts/etn-profile-dev/public/data/shared_images";

    fn document(name: &str, bytes: &[u8]) -> NewSharedImage {
        NewSharedImage::from_upload(&UploadFile::new(name, "image/png", bytes.to_vec()), Some("uid-7"))
    }

    #[tokio::test]
    async fn test_local_store_create_and_get() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        let id = store
            .create(COLLECTION, &document("cat.png", b"0123456789"))
            .await
            .unwrap();

        let image = store.get_by_id(COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(image.id, id);
        assert_eq!(image.owner_id, "uid-7");
        assert_eq!(image.decode().unwrap(), b"0123456789");

        let on_disk = dir.path().join(COLLECTION).join(format!("{}.json", id));
        assert!(on_disk.exists());
    }

    #[tokio::test]
    async fn test_local_store_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        store
            .create(COLLECTION, &document("a.png", b"a"))
            .await
            .unwrap();

        let mut entries = fs::read_dir(dir.path().join(COLLECTION)).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().into_owned();
            assert!(name.ends_with(".json"), "unexpected file {}", name);
        }
    }

    #[tokio::test]
    async fn test_local_store_missing_document() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        assert!(store
            .get_by_id(COLLECTION, "doesnotexist")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_local_store_path_traversal_prevention() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        assert!(store
            .get_by_id(COLLECTION, "../../../etc/passwd")
            .await
            .unwrap()
            .is_none());

        let result = store.create("../outside", &document("a.png", b"a")).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_store_corrupt_document_is_an_error() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        let collection_dir = dir.path().join(COLLECTION);
        fs::create_dir_all(&collection_dir).await.unwrap();
        fs::write(collection_dir.join("broken.json"), b"{not json")
            .await
            .unwrap();

        let result = store.get_by_id(COLLECTION, "broken").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_local_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = LocalStore::new(dir.path()).await.unwrap();
            store
                .create(COLLECTION, &document("persist.png", b"persisted"))
                .await
                .unwrap()
        };

        let reopened = LocalStore::new(dir.path()).await.unwrap();
        let image = reopened.get_by_id(COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(image.filename, "persist.png");
    }
}
