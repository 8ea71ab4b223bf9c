//! Multipart upload extraction

use axum::extract::Multipart;
use etn_core::{AppError, UploadFile};

use crate::constants::FILE_FIELD;

/// Extract the file from a multipart form.
///
/// Only one field named "file" is accepted; multiple file fields are rejected.
/// Returns `None` when the form carries no file field so the uploader can report
/// that no file was selected.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<Option<UploadFile>, AppError> {
    let mut file: Option<UploadFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        file = Some(UploadFile::new(filename, content_type, data.to_vec()));
    }

    Ok(file)
}
