//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p etn-api`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use etn_api::constants::API_PREFIX;
use etn_api::setup::{build_state, routes, BackendSetup};
use etn_api::state::IdentityStatus;
use etn_core::Config;
use etn_services::{Backend, RecordingStatusReporter};
use etn_store::{DocumentStore, MemoryStore};

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("STORE_BACKEND", "memory"),
        ("ENVIRONMENT", "test"),
        ("MAX_FILE_SIZE_MB", "1"),
        ("SHARE_BASE_URL", "https://etn.lol/"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

/// Test application: server plus direct access to the backing store.
pub struct TestApp {
    pub server: TestServer,
    pub store: Option<Arc<dyn DocumentStore>>,
    pub reporter: Arc<RecordingStatusReporter>,
    pub config: Config,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn build(config: Config, backend: BackendSetup, store: Option<Arc<dyn DocumentStore>>) -> TestApp {
    let reporter = Arc::new(RecordingStatusReporter::new());
    let state = build_state(config.clone(), backend, reporter.clone());
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        store,
        reporter,
        config,
    }
}

/// App over an in-memory store with an anonymous session.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn setup_test_app_with_store(store: Arc<dyn DocumentStore>) -> TestApp {
    let config = test_config(&[]);
    let backend = Backend::new(store.clone(), None, config.collection_path());
    build(
        config,
        BackendSetup {
            backend: Some(Arc::new(backend)),
            identity: IdentityStatus::Anonymous,
        },
        Some(store),
    )
}

/// App over whatever `setup_backend` produced for `config`.
pub fn setup_app_from_backend(config: Config, backend: BackendSetup) -> TestApp {
    let store = backend.backend.as_ref().map(|b| b.store.clone());
    build(config, backend, store)
}

/// App whose store could not be initialized.
pub fn setup_degraded_app() -> TestApp {
    build(
        test_config(&[]),
        BackendSetup {
            backend: None,
            identity: IdentityStatus::Unavailable,
        },
        None,
    )
}

pub mod fixtures {
    /// Smallest valid PNG: 1x1 transparent pixel.
    pub fn minimal_png() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ]
    }
}
