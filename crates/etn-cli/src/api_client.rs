//! HTTP client for the etn API.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use etn_core::encoding::decode_content;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::guess_mime_type;

const API_PREFIX: &str = "/api/v1";
const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Response of `POST /api/v1/images`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub mime_type: String,
    pub status: String,
}

/// Response of `GET /api/v1/images/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
    pub data_url: String,
}

impl ImageResponse {
    /// Decode the image bytes carried in `data_url`.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        decode_content(&self.data_url).context("Image content is not valid base64")
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    code: String,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: ETN_API_URL (default http://localhost:4000).
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("ETN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload the file at `file_path` and return its shareable link.
    pub async fn upload_image(&self, file_path: &Path) -> Result<UploadResponse> {
        let buffer = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read {}", file_path.display()))?;

        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(buffer)
            .file_name(filename)
            .mime_str(guess_mime_type(file_path))
            .context("Invalid mime type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.build_url(&format!("{}/images", API_PREFIX)))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    /// Fetch an image's metadata and content by id.
    pub async fn get_image(&self, id: &str) -> Result<ImageResponse> {
        let response = self
            .client
            .get(self.build_url(&format!("{}/images/{}", API_PREFIX, id)))
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = match serde_json::from_str::<ApiErrorBody>(&error_text) {
            Ok(body) => format!("{} ({})", body.error, body.code),
            Err(_) => error_text,
        };
        return Err(anyhow::anyhow!(
            "API request failed with status {}: {}",
            status,
            message
        ));
    }

    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}
