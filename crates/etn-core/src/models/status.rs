use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use serde::Serialize;

use crate::constants::STATUS_REASON_MAX_LEN;

/// Phase of an upload, reported to the caller as it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum UploadStatus {
    Selected { filename: String },
    Encoding,
    Saving,
    Retrying { attempt: u32, delay_ms: u64 },
    Succeeded { url: String },
    Failed { message: String },
}

impl UploadStatus {
    pub fn retrying(attempt: u32, delay: Duration) -> Self {
        UploadStatus::Retrying {
            attempt,
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadStatus::Succeeded { .. } | UploadStatus::Failed { .. }
        )
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            UploadStatus::Selected { filename } => format!("File selected: {}", filename),
            UploadStatus::Encoding => "Encoding image...".to_string(),
            UploadStatus::Saving => "Image encoded. Saving to cloud...".to_string(),
            UploadStatus::Retrying { delay_ms, .. } => {
                format!("Upload failed, retrying in {}s...", delay_ms / 1000)
            }
            UploadStatus::Succeeded { .. } => {
                "Success! Image is now shareable on etn.lol.".to_string()
            }
            UploadStatus::Failed { message } => message.clone(),
        }
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.message())
    }
}

/// Failure line for an exhausted upload, echoing a bounded slice of the reason.
pub fn upload_failed_message(reason: &str) -> String {
    format!(
        "Upload failed: {}...",
        truncate_chars(reason, STATUS_REASON_MAX_LEN)
    )
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_message_reports_whole_seconds() {
        let status = UploadStatus::retrying(2, Duration::from_secs(4));
        assert_eq!(status.message(), "Upload failed, retrying in 4s...");
        assert!(!status.is_terminal());
    }

    #[test]
    fn success_is_terminal() {
        let status = UploadStatus::Succeeded {
            url: "https://etn.lol/?view=abc123".to_string(),
        };
        assert!(status.is_terminal());
        assert_eq!(status.to_string(), "Success! Image is now shareable on etn.lol.");
    }

    #[test]
    fn failure_message_is_bounded() {
        let reason = "x".repeat(200);
        let message = upload_failed_message(&reason);
        assert_eq!(message.len(), "Upload failed: ".len() + 80 + "...".len());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn status_serializes_with_phase_tag() {
        let json = serde_json::to_value(UploadStatus::Saving).unwrap();
        assert_eq!(json["phase"], "saving");
    }
}
