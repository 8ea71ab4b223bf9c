use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use etn_core::UploadStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub mime_type: String,
    /// Final status line of the upload
    pub status: String,
}

#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let (filename, mime_type) = file
        .as_ref()
        .map(|f| (f.filename.clone(), f.mime_type.clone()))
        .unwrap_or_default();

    let link = state.uploader.submit(file).await?;

    let status = UploadStatus::Succeeded {
        url: link.url.clone(),
    }
    .message();

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: link.id,
            url: link.url,
            filename,
            mime_type,
            status,
        }),
    ))
}
