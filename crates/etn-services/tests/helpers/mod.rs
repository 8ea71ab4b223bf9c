//! Shared fixtures for service tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use etn_core::{NewSharedImage, SharedImage, StoreBackend};
use etn_services::{Backend, RecordingStatusReporter, RetryPolicy, Uploader, Viewer};
use etn_store::{DocumentStore, StoreError, StoreResult};

pub const COLLECTION: &str = "artifacts/etn-profile-dev/public/data/shared_images";
pub const SHARE_BASE_URL: &str = "https://etn.lol/";

/// Store whose writes can be made to fail a set number of times, and whose ids
/// can be fixed.
#[derive(Default)]
pub struct ScriptedStore {
    documents: Mutex<HashMap<String, SharedImage>>,
    failures_left: AtomicU32,
    permanent_failures: bool,
    fixed_id: Option<String>,
    next_id: AtomicU32,
    pub create_calls: AtomicU32,
    pub get_calls: AtomicU32,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` writes with a transient error.
    pub fn failing(n: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(n),
            ..Self::default()
        }
    }

    /// Fail every write with a permanent error.
    pub fn rejecting() -> Self {
        Self {
            failures_left: AtomicU32::new(u32::MAX),
            permanent_failures: true,
            ..Self::default()
        }
    }

    pub fn with_fixed_id(id: &str) -> Self {
        Self {
            fixed_id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn creates(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn create(&self, _collection: &str, document: &NewSharedImage) -> StoreResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(if self.permanent_failures {
                StoreError::Permanent("PERMISSION_DENIED".to_string())
            } else {
                StoreError::Transient("503 Service Unavailable".to_string())
            });
        }

        let id = match &self.fixed_id {
            Some(id) => id.clone(),
            None => format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        self.documents
            .lock()
            .unwrap()
            .insert(id.clone(), document.clone().into_shared_image(id.clone()));
        Ok(id)
    }

    async fn get_by_id(&self, _collection: &str, id: &str) -> StoreResult<Option<SharedImage>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.lock().unwrap().get(id).cloned())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

pub struct Harness {
    pub store: Arc<ScriptedStore>,
    pub reporter: Arc<RecordingStatusReporter>,
    pub uploader: Uploader,
    pub viewer: Viewer,
}

pub fn harness(store: ScriptedStore) -> Harness {
    let store = Arc::new(store);
    let backend = Arc::new(Backend::new(store.clone(), None, COLLECTION));
    let reporter = Arc::new(RecordingStatusReporter::new());
    let uploader = Uploader::new(
        Some(backend.clone()),
        SHARE_BASE_URL,
        10 * 1024 * 1024,
        RetryPolicy::new(5, Duration::from_secs(1)),
        reporter.clone(),
    );
    let viewer = Viewer::new(Some(backend));

    Harness {
        store,
        reporter,
        uploader,
        viewer,
    }
}
