//! etn Core Library
//!
//! This crate provides the domain model, error types, configuration, and content
//! codec shared by every etn component.

pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StoreConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, UploadError, ViewError};
pub use models::{DecodedImage, NewSharedImage, ShareableLink, SharedImage, UploadFile, UploadStatus};
pub use store_types::StoreBackend;
