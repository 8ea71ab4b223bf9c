//! etn Store Library
//!
//! This crate provides the document store and identity abstractions for etn, with
//! in-memory, local filesystem, and Firestore REST implementations.
//!
//! # Document layout
//!
//! Documents live in a collection addressed by a slash-separated path with an odd
//! number of segments, e.g. `artifacts/{app_id}/public/data/shared_images`. Document
//! ids are assigned by the store on `create`. Paths and ids must not contain `..`,
//! empty segments, or a leading `/`; validation is centralized in the `keys` module.

pub mod factory;
#[cfg(feature = "store-firestore")]
pub mod firestore;
pub mod identity;
pub(crate) mod keys;
#[cfg(feature = "store-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use etn_core::StoreBackend;
pub use factory::{create_identity, create_store};
#[cfg(feature = "store-firestore")]
pub use firestore::{FirebaseIdentity, FirestoreStore, TokenRefresher};
pub use identity::LocalAnonymousIdentity;
#[cfg(feature = "store-local")]
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use traits::{DocumentStore, IdentityError, IdentityProvider, Session, StoreError, StoreResult};
