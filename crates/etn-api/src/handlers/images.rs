use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use etn_core::encoding::{encode_content, to_data_url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
    pub data_url: String,
}

#[tracing::instrument(skip(state), fields(image_id = %id, operation = "get_image"))]
pub async fn get_image(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state.viewer.resolve(Some(&id)).await?;

    let data_url = to_data_url(&image.mime_type, &encode_content(&image.bytes));
    Ok(Json(ImageResponse {
        size: image.bytes.len(),
        id: image.id,
        filename: image.filename,
        mime_type: image.mime_type,
        data_url,
    }))
}
