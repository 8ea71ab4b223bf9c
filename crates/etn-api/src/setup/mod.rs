//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod backend;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use etn_core::Config;
use etn_services::{StatusReporter, TracingStatusReporter, Uploader, Viewer};
use std::sync::Arc;

pub use backend::{setup_backend, BackendSetup};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        store_backend = %config.store.backend,
        "Configuration loaded and validated successfully"
    );

    // Sign in and connect the store; failures leave the app degraded, not down
    let backend = setup_backend(&config).await;

    let state = build_state(config, backend, Arc::new(TracingStatusReporter));

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

/// Assemble the shared state from a configured backend.
pub fn build_state(
    config: Config,
    backend: BackendSetup,
    reporter: Arc<dyn StatusReporter>,
) -> Arc<AppState> {
    let store_backend = backend
        .backend
        .as_ref()
        .map(|b| b.store.backend_type());

    let uploader = Uploader::from_config(backend.backend.clone(), &config.upload, reporter);
    let viewer = Viewer::new(backend.backend);

    Arc::new(AppState {
        config,
        uploader,
        viewer,
        store_backend,
        identity: backend.identity,
    })
}
