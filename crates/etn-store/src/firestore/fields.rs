//! Firestore REST document encoding
//!
//! Firestore wraps every field in a typed value (`{"stringValue": "..."}`). The web
//! client that shares this collection stores a data URL under `base64` and renders
//! it directly, so that is what gets written. Reads accept `base64` or `content`,
//! holding either a data URL or bare base64.

use std::collections::HashMap;

use etn_core::encoding::to_data_url;
use etn_core::{NewSharedImage, SharedImage};
use serde::{Deserialize, Serialize};

use crate::traits::{StoreError, StoreResult};

const CONTENT_FIELD: &str = "base64";
const CONTENT_FIELD_ALT: &str = "content";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
}

impl FieldValue {
    fn string(value: &str) -> Self {
        FieldValue {
            string_value: Some(value.to_string()),
            timestamp_value: None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        self.string_value
            .as_deref()
            .or(self.timestamp_value.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WriteDocument {
    pub fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReadDocument {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}

impl ReadDocument {
    /// Document id: the last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

pub(crate) fn to_write_document(document: &NewSharedImage) -> WriteDocument {
    let content = to_data_url(&document.mime_type, &document.content);
    let fields = [
        (CONTENT_FIELD, content.as_str()),
        ("filename", document.filename.as_str()),
        ("mimeType", document.mime_type.as_str()),
        ("uploadedAt", document.uploaded_at.as_str()),
        ("ownerId", document.owner_id.as_str()),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), FieldValue::string(value)))
    .collect();

    WriteDocument { fields }
}

fn field<'a>(fields: &'a HashMap<String, FieldValue>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(FieldValue::as_str)
}

pub(crate) fn from_read_document(document: ReadDocument) -> StoreResult<SharedImage> {
    let fields = &document.fields;

    let content = field(fields, CONTENT_FIELD)
        .or_else(|| field(fields, CONTENT_FIELD_ALT))
        .ok_or_else(|| {
            StoreError::Permanent(format!("Document {} has no image content", document.name))
        })?
        .to_string();

    // The mime type can be recovered from a data URL when the field is missing.
    let mime_type = field(fields, "mimeType")
        .or_else(|| etn_core::encoding::data_url_mime(&content))
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(SharedImage {
        id: document.id().to_string(),
        filename: field(fields, "filename").unwrap_or_default().to_string(),
        mime_type,
        uploaded_at: field(fields, "uploadedAt").unwrap_or_default().to_string(),
        owner_id: field(fields, "ownerId")
            .unwrap_or(etn_core::constants::ANONYMOUS_OWNER_ID)
            .to_string(),
        content,
    })
}
