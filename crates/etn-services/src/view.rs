use std::sync::Arc;

use etn_core::{DecodedImage, ViewError};

use crate::backend::Backend;

/// Resolves the id carried by a shareable link back to the stored image.
pub struct Viewer {
    backend: Option<Arc<Backend>>,
}

impl Viewer {
    pub fn new(backend: Option<Arc<Backend>>) -> Self {
        Self { backend }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Fetch and decode the image stored under `view_id`. Reads once, without retry.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, view_id: Option<&str>) -> Result<DecodedImage, ViewError> {
        let id = match view_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ViewError::MissingId),
        };

        let backend = self.backend.as_deref().ok_or(ViewError::ServiceUnavailable)?;

        let image = match backend.store.get_by_id(&backend.collection, id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                tracing::warn!(document_id = %id, "Image not found");
                return Err(ViewError::NotFound(id.to_string()));
            }
            Err(e) => {
                tracing::error!(document_id = %id, error = %e, "Failed to fetch image");
                return Err(ViewError::FetchFailed(e.to_string()));
            }
        };

        let bytes = image.decode().map_err(|e| ViewError::InvalidContent {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(document_id = %id, size = bytes.len(), "Image resolved");

        Ok(DecodedImage {
            id: image.id,
            filename: image.filename,
            mime_type: image.mime_type,
            bytes,
        })
    }
}
