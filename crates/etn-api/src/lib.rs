//! etn API Library
//!
//! This crate provides the HTTP handlers and application setup for the image share:
//! upload, the `?view=<id>` share route, JSON metadata, and health.

// Module declarations
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
