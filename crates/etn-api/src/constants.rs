//! API constants

/// Versioned prefix for the JSON API
pub const API_PREFIX: &str = "/api/v1";

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Allowance on top of the maximum file size for multipart framing and headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Documents are immutable once created
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
