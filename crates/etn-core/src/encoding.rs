//! Base64 content codec
//!
//! Documents store the full file as standard padded base64. Documents written by
//! the web client hold a data URL (`data:<mime>;base64,<payload>`) instead, so
//! decoding accepts both forms. Encoding always produces bare base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("data URL is not base64-encoded")]
    UnsupportedDataUrl,
}

pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode stored content, accepting bare base64 or a base64 data URL.
pub fn decode_content(content: &str) -> Result<Vec<u8>, ContentError> {
    let payload = match content.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or(ContentError::UnsupportedDataUrl)?;
            if !header.ends_with(";base64") {
                return Err(ContentError::UnsupportedDataUrl);
            }
            payload
        }
        None => content,
    };
    Ok(STANDARD.decode(payload.trim())?)
}

/// Mime type declared in a data URL header, if `content` is one.
pub fn data_url_mime(content: &str) -> Option<&str> {
    let header = content.strip_prefix("data:")?.split_once(',')?.0;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

/// Render content as a data URL suitable for an `<img src>`.
pub fn to_data_url(mime_type: &str, content: &str) -> String {
    if content.starts_with("data:") {
        return content.to_string();
    }
    format!("data:{};base64,{}", mime_type, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_base64() {
        let encoded = encode_content(b"\x89PNG\r\n");
        assert_eq!(decode_content(&encoded).unwrap(), b"\x89PNG\r\n");
    }

    #[test]
    fn decodes_data_url_written_by_web_client() {
        let content = "data:image/png;base64,aGVsbG8=";
        assert_eq!(decode_content(content).unwrap(), b"hello");
        assert_eq!(data_url_mime(content), Some("image/png"));
    }

    #[test]
    fn rejects_percent_encoded_data_url() {
        let result = decode_content("data:text/plain,hello%20world");
        assert!(matches!(result, Err(ContentError::UnsupportedDataUrl)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode_content("not base64!!"),
            Err(ContentError::Base64(_))
        ));
    }

    #[test]
    fn data_url_wraps_bare_content_only_once() {
        assert_eq!(
            to_data_url("image/gif", "R0lG"),
            "data:image/gif;base64,R0lG"
        );
        assert_eq!(
            to_data_url("image/gif", "data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
        assert_eq!(data_url_mime("R0lG"), None);
    }
}
