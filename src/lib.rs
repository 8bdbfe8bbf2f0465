//! Data access layer for the household services application.
//!
//! Users, family members, the service catalog, service requests and
//! notifications live in a managed document database. [`Database`] turns
//! typed calls into store requests and store documents back into typed
//! records; the store itself is injected through [`store::DocumentStore`].

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Collections, Config, OwnerQueryStrategy};
pub use db::{observer, Database, SnapshotObserver};
pub use errors::{DataError, StoreError};
pub use store::{DocumentStore, MemoryStore, Subscription};
