use crate::constants::IMMUTABLE_CACHE_CONTROL;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderValue},
    response::IntoResponse,
};
use etn_core::ShareableLink;
use std::sync::Arc;

/// Serve the image a shareable link points at: `GET /?view=<id>`.
#[tracing::instrument(skip(state, query), fields(operation = "view_image"))]
pub async fn view_image(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, HttpAppError> {
    let view_id = query.as_deref().and_then(ShareableLink::view_id);
    let image = state.viewer.resolve(view_id.as_deref()).await?;

    let content_type = HeaderValue::from_str(&image.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        sanitize_filename(&image.filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
            ),
        ],
        image.bytes,
    ))
}

/// Filename safe to embed in a quoted header parameter.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("a\"b\\c\r\n.png"), "abc.png");
    }
}
