use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ANONYMOUS_OWNER_ID;
use crate::encoding::{decode_content, encode_content, ContentError};

/// One uploaded image, as persisted in the shared collection.
///
/// Created once by the uploader and never mutated afterwards. `id` is assigned by
/// the store when the document is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedImage {
    pub id: String,
    pub content: String,
    pub filename: String,
    pub mime_type: String,
    pub uploaded_at: String,
    pub owner_id: String,
}

impl SharedImage {
    pub fn decode(&self) -> Result<Vec<u8>, ContentError> {
        decode_content(&self.content)
    }
}

/// A shared image before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSharedImage {
    pub content: String,
    pub filename: String,
    pub mime_type: String,
    pub uploaded_at: String,
    pub owner_id: String,
}

impl NewSharedImage {
    /// Encode `file` and stamp it with the current time and owner.
    ///
    /// `owner_id` falls back to the anonymous sentinel when no session exists.
    pub fn from_upload(file: &UploadFile, owner_id: Option<&str>) -> Self {
        Self {
            content: encode_content(&file.bytes),
            filename: file.filename.clone(),
            mime_type: file.mime_type.clone(),
            uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            owner_id: owner_id.unwrap_or(ANONYMOUS_OWNER_ID).to_string(),
        }
    }

    pub fn into_shared_image(self, id: impl Into<String>) -> SharedImage {
        SharedImage {
            id: id.into(),
            content: self.content,
            filename: self.filename,
            mime_type: self.mime_type,
            uploaded_at: self.uploaded_at,
            owner_id: self.owner_id,
        }
    }
}

/// A file selected for upload, held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Decoded content of a shared image, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_png() -> UploadFile {
        UploadFile::new("cat.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn new_document_defaults_to_anonymous_owner() {
        let doc = NewSharedImage::from_upload(&cat_png(), None);
        assert_eq!(doc.owner_id, ANONYMOUS_OWNER_ID);
        assert_eq!(doc.filename, "cat.png");
        assert_eq!(doc.mime_type, "image/png");
        assert!(doc.uploaded_at.ends_with('Z'));
    }

    #[test]
    fn document_keeps_full_content() {
        let file = cat_png();
        let image = NewSharedImage::from_upload(&file, Some("uid-1")).into_shared_image("abc123");
        assert_eq!(image.id, "abc123");
        assert_eq!(image.owner_id, "uid-1");
        assert_eq!(image.decode().unwrap(), file.bytes);
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let image = NewSharedImage::from_upload(&cat_png(), None).into_shared_image("abc123");
        let json = serde_json::to_value(&image).unwrap();
        assert!(json.get("mimeType").is_some());
        assert!(json.get("uploadedAt").is_some());
        assert!(json.get("ownerId").is_some());
    }
}
