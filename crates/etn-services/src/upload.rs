use std::sync::Arc;

use etn_core::{NewSharedImage, ShareableLink, UploadConfig, UploadError, UploadFile, UploadStatus};
use etn_store::StoreError;

use crate::backend::Backend;
use crate::retry::{with_retry, RetryPolicy};
use crate::status::StatusReporter;

/// Stores an image file and returns a link that resolves to it.
pub struct Uploader {
    backend: Option<Arc<Backend>>,
    share_base_url: String,
    max_file_size: usize,
    retry_policy: RetryPolicy,
    reporter: Arc<dyn StatusReporter>,
}

impl Uploader {
    pub fn new(
        backend: Option<Arc<Backend>>,
        share_base_url: impl Into<String>,
        max_file_size: usize,
        retry_policy: RetryPolicy,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            backend,
            share_base_url: share_base_url.into(),
            max_file_size,
            retry_policy,
            reporter,
        }
    }

    pub fn from_config(
        backend: Option<Arc<Backend>>,
        config: &UploadConfig,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        Self::new(
            backend,
            config.share_base_url.clone(),
            config.max_file_size_bytes,
            RetryPolicy::new(config.max_attempts, config.retry_base_delay),
            reporter,
        )
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Upload `file` and return its shareable link.
    ///
    /// Transient store failures are retried with exponential backoff; every phase
    /// is reported to the status reporter. A failed upload leaves no document.
    #[tracing::instrument(skip(self, file), fields(filename = tracing::field::Empty, size = tracing::field::Empty))]
    pub async fn submit(&self, file: Option<UploadFile>) -> Result<ShareableLink, UploadError> {
        let file = match file {
            Some(file) if file.size() > 0 => file,
            _ => return Err(self.fail(UploadError::NoFileSelected)),
        };

        let span = tracing::Span::current();
        span.record("filename", file.filename.as_str());
        span.record("size", file.size());

        self.reporter.report(&UploadStatus::Selected {
            filename: file.filename.clone(),
        });

        let Some(backend) = self.backend.as_deref() else {
            return Err(self.fail(UploadError::ServiceUnavailable));
        };

        if file.size() > self.max_file_size {
            return Err(self.fail(UploadError::FileTooLarge {
                size: file.size(),
                max: self.max_file_size,
            }));
        }

        self.reporter.report(&UploadStatus::Encoding);
        let document = NewSharedImage::from_upload(&file, Some(backend.owner_id()));
        drop(file);

        self.reporter.report(&UploadStatus::Saving);
        let created = with_retry(
            &self.retry_policy,
            StoreError::is_transient,
            |notice| {
                tracing::warn!(
                    attempt = notice.attempt,
                    delay_ms = notice.delay.as_millis() as u64,
                    error = %notice.error,
                    "Store write failed, retrying"
                );
                self.reporter
                    .report(&UploadStatus::retrying(notice.attempt, notice.delay));
            },
            |attempt| {
                tracing::debug!(attempt, collection = %backend.collection, "Writing document");
                backend.store.create(&backend.collection, &document)
            },
        )
        .await;

        match created {
            Ok(id) => {
                let link = ShareableLink::new(&self.share_base_url, id);
                tracing::info!(document_id = %link.id, url = %link.url, "Image shared");
                self.reporter
                    .report(&UploadStatus::Succeeded { url: link.url.clone() });
                Ok(link)
            }
            Err(e) => Err(self.fail(UploadError::UploadFailed(e.to_string()))),
        }
    }

    fn fail(&self, error: UploadError) -> UploadError {
        self.reporter.report(&UploadStatus::Failed {
            message: error.status_message(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RecordingStatusReporter;
    use etn_store::MemoryStore;
    use std::time::Duration;

    const COLLECTION: &str = "artifacts/test/public/data/shared_images";

    fn uploader(
        backend: Option<Arc<Backend>>,
        reporter: Arc<RecordingStatusReporter>,
    ) -> Uploader {
        Uploader::new(
            backend,
            "https://etn.lol/",
            16,
            RetryPolicy::new(5, Duration::from_secs(1)),
            reporter,
        )
    }

    fn memory_backend() -> Arc<Backend> {
        Arc::new(Backend::new(Arc::new(MemoryStore::new()), None, COLLECTION))
    }

    #[tokio::test]
    async fn test_no_file_selected() {
        let reporter = Arc::new(RecordingStatusReporter::new());
        let uploader = uploader(Some(memory_backend()), reporter.clone());

        assert_eq!(uploader.submit(None).await, Err(UploadError::NoFileSelected));
        let empty = UploadFile::new("empty.png", "image/png", Vec::new());
        assert_eq!(
            uploader.submit(Some(empty)).await,
            Err(UploadError::NoFileSelected)
        );
        assert_eq!(
            reporter.last().map(|s| s.message()),
            Some("Please select an image file to upload.".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_backend_is_service_unavailable() {
        let reporter = Arc::new(RecordingStatusReporter::new());
        let uploader = uploader(None, reporter.clone());

        let file = UploadFile::new("cat.png", "image/png", b"0123456789".to_vec());
        assert_eq!(
            uploader.submit(Some(file)).await,
            Err(UploadError::ServiceUnavailable)
        );
        assert!(!reporter.statuses().contains(&UploadStatus::Encoding));
    }

    #[tokio::test]
    async fn test_file_too_large() {
        let reporter = Arc::new(RecordingStatusReporter::new());
        let uploader = uploader(Some(memory_backend()), reporter);

        let file = UploadFile::new("big.png", "image/png", vec![0u8; 17]);
        assert_eq!(
            uploader.submit(Some(file)).await,
            Err(UploadError::FileTooLarge { size: 17, max: 16 })
        );
    }

    #[tokio::test]
    async fn test_success_reports_phases_in_order() {
        let reporter = Arc::new(RecordingStatusReporter::new());
        let uploader = uploader(Some(memory_backend()), reporter.clone());

        let file = UploadFile::new("cat.png", "image/png", b"0123456789".to_vec());
        let link = uploader.submit(Some(file)).await.unwrap();

        assert_eq!(link.url, format!("https://etn.lol/?view={}", link.id));
        assert_eq!(
            reporter.statuses(),
            vec![
                UploadStatus::Selected {
                    filename: "cat.png".to_string()
                },
                UploadStatus::Encoding,
                UploadStatus::Saving,
                UploadStatus::Succeeded { url: link.url },
            ]
        );
    }
}
