//! Document path rules shared by all backends
//!
//! Collection paths alternate collection/document segments and end on a collection,
//! so they have an odd number of segments. Document ids are single segments.

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::traits::{StoreError, StoreResult};

const DOCUMENT_ID_LEN: usize = 20;
const MAX_SEGMENT_BYTES: usize = 1500;

pub(crate) fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

pub(crate) fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SEGMENT_BYTES
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
        && !(id.starts_with("__") && id.ends_with("__"))
}

pub(crate) fn validate_collection(collection: &str) -> StoreResult<()> {
    if collection.starts_with('/') || collection.ends_with('/') {
        return Err(StoreError::InvalidKey(format!(
            "Collection path must not start or end with '/': {}",
            collection
        )));
    }

    let segments: Vec<&str> = collection.split('/').collect();
    if segments.len() % 2 == 0 {
        return Err(StoreError::InvalidKey(format!(
            "Collection path must have an odd number of segments: {}",
            collection
        )));
    }

    if let Some(bad) = segments.iter().find(|s| !is_valid_document_id(s)) {
        return Err(StoreError::InvalidKey(format!(
            "Invalid collection path segment '{}' in {}",
            bad, collection
        )));
    }

    Ok(())
}
