//! Error types module
//!
//! `UploadError` and `ViewError` are the result types of the two core operations.
//! `AppError` wraps them (plus a few generic failures) for the outer surfaces and
//! self-describes its HTTP presentation through `ErrorMetadata`.

use crate::models::upload_failed_message;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a missing file or id
    Debug,
    /// Warning level - for degraded service or unknown ids
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failure of `Uploader::submit`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Service unavailable: store or identity not initialized")]
    ServiceUnavailable,

    #[error("File too large: {size} bytes exceeds max {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl UploadError {
    /// Status line shown to the uploader.
    pub fn status_message(&self) -> String {
        match self {
            UploadError::NoFileSelected => "Please select an image file to upload.".to_string(),
            UploadError::ServiceUnavailable => {
                "Error: Service not ready. Check connection and Firebase configuration."
                    .to_string()
            }
            UploadError::FileTooLarge { size, max } => format!(
                "File too large: {} bytes exceeds the {} byte limit.",
                size, max
            ),
            UploadError::UploadFailed(reason) => upload_failed_message(reason),
        }
    }
}

/// Failure of `Viewer::resolve`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("Missing image id")]
    MissingId,

    #[error("Service unavailable: store not initialized")]
    ServiceUnavailable,

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Stored content for {id} is not decodable: {reason}")]
    InvalidContent { id: String, reason: String },
}

impl ViewError {
    /// Status line shown by the viewer. Not-found and transport failures read differently.
    pub fn status_message(&self) -> String {
        match self {
            ViewError::MissingId => "Database or Image ID is missing.".to_string(),
            ViewError::ServiceUnavailable => {
                "Service unavailable. Firebase not configured.".to_string()
            }
            ViewError::NotFound(id) => format!(
                "Image not found with ID: {}. It may have been purged.",
                id
            ),
            ViewError::FetchFailed(_) => "Failed to load image data. Connection issue?".to_string(),
            ViewError::InvalidContent { id, .. } => {
                format!("Image {} is corrupted and cannot be displayed.", id)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Upload(UploadError::NoFileSelected) => (
            400,
            "NO_FILE_SELECTED",
            false,
            Some("Attach a file in the 'file' form field"),
            false,
            LogLevel::Debug,
        ),
        AppError::Upload(UploadError::ServiceUnavailable)
        | AppError::View(ViewError::ServiceUnavailable) => (
            503,
            "SERVICE_UNAVAILABLE",
            true,
            Some("Check store and identity configuration"),
            false,
            LogLevel::Warn,
        ),
        AppError::Upload(UploadError::FileTooLarge { .. }) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Upload(UploadError::UploadFailed(_)) => (
            502,
            "UPLOAD_FAILED",
            true,
            Some("Retry the upload later"),
            true,
            LogLevel::Error,
        ),
        AppError::View(ViewError::MissingId) => (
            400,
            "MISSING_ID",
            false,
            Some("Provide the image id in the 'view' query parameter"),
            false,
            LogLevel::Debug,
        ),
        AppError::View(ViewError::NotFound(_)) => (
            404,
            "IMAGE_NOT_FOUND",
            false,
            Some("Verify the link; the image may have been purged"),
            false,
            LogLevel::Debug,
        ),
        AppError::View(ViewError::FetchFailed(_)) => (
            502,
            "FETCH_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::View(ViewError::InvalidContent { .. }) => (
            500,
            "INVALID_CONTENT",
            false,
            None,
            false,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Upload(UploadError::NoFileSelected) => "NoFileSelected",
            AppError::Upload(UploadError::ServiceUnavailable) => "ServiceUnavailable",
            AppError::Upload(UploadError::FileTooLarge { .. }) => "FileTooLarge",
            AppError::Upload(UploadError::UploadFailed(_)) => "UploadFailed",
            AppError::View(ViewError::MissingId) => "MissingId",
            AppError::View(ViewError::ServiceUnavailable) => "ServiceUnavailable",
            AppError::View(ViewError::NotFound(_)) => "NotFound",
            AppError::View(ViewError::FetchFailed(_)) => "FetchFailed",
            AppError::View(ViewError::InvalidContent { .. }) => "InvalidContent",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Upload(err) => err.status_message(),
            AppError::View(err) => err.status_message(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
