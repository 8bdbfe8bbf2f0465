//! Document store client abstraction.
//!
//! [`DocumentStore`] is the single seam between the data access layer and the
//! managed document database. Anything that can fetch, query, insert, merge,
//! delete and watch schemaless documents grouped into named collections can
//! back a [`crate::db::Database`]. [`MemoryStore`] is the embedded
//! implementation used in tests and local setups.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::errors::StoreError;

pub mod memory;

pub use memory::{CompositeIndex, MemoryStore};

/// Raw field mapping of a stored document
pub type FieldMap = Map<String, Value>;

/// Callback registered with [`DocumentStore::listen`].
///
/// Invoked with the full matching result set every time it changes, or with
/// the error that terminated the listener.
pub type SnapshotCallback = Box<dyn Fn(Result<Vec<Document>, StoreError>) + Send + Sync>;

/// A document as returned by the store: its store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: FieldMap,
}

impl Document {
    pub fn new<S: Into<String>>(id: S, fields: FieldMap) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Exact-match filter on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// A collection-scoped query: equality filters plus an optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection<S: Into<String>>(name: S) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq<S: Into<String>, V: Into<Value>>(mut self, field: S, value: V) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by<S: Into<String>>(mut self, field: S, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Whether a document satisfies every equality filter of this query
    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|filter| document.get(&filter.field) == Some(&filter.value))
    }
}

/// Handle to a standing change listener.
///
/// Cancelling (or dropping) the handle detaches the listener. No callback
/// runs for a store change made after `cancel` returns; a delivery that was
/// already in progress on another task may still complete.
pub struct Subscription {
    token: CancellationToken,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token, on_cancel: None }
    }

    /// Like [`Subscription::new`], running `cleanup` once when detached
    pub fn with_cleanup<F>(token: CancellationToken, cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            token,
            on_cancel: Some(Box::new(cleanup)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        self.token.cancel();
        if let Some(cleanup) = self.on_cancel.take() {
            cleanup();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

/// Client interface of a managed document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` if it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Insert a document under a store-assigned id and return that id
    async fn add(&self, collection: &str, fields: FieldMap) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: FieldMap) -> Result<(), StoreError>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Register a change listener on `query`.
    ///
    /// The current result set is delivered once on registration, then again
    /// every time it changes.
    async fn listen(&self, query: Query, callback: SnapshotCallback) -> Result<Subscription, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn doc(id: &str, value: Value) -> Document {
        match value {
            Value::Object(fields) => Document::new(id, fields),
            _ => panic!("test documents must be objects"),
        }
    }

    #[test]
    fn test_query_matches_all_filters() {
        let query = Query::collection("serviceRequests")
            .where_eq("userId", "u1")
            .where_eq("status", "approved");

        assert!(query.matches(&doc("r1", json!({"userId": "u1", "status": "approved"}))));
        assert!(!query.matches(&doc("r2", json!({"userId": "u1", "status": "rejected"}))));
        assert!(!query.matches(&doc("r3", json!({"status": "approved"}))));
    }

    #[test]
    fn test_query_without_filters_matches_everything() {
        let query = Query::collection("users").order_by("createdAt", Direction::Descending);
        assert!(query.matches(&doc("u1", json!({}))));
        assert_eq!(
            query.order_by,
            Some(OrderBy {
                field: "createdAt".to_string(),
                direction: Direction::Descending
            })
        );
    }

    #[test]
    fn test_subscription_cleanup_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let token = CancellationToken::new();
        let subscription = Subscription::with_cleanup(token.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!subscription.is_cancelled());
        subscription.cancel();

        assert!(token.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_subscription_cancels_it() {
        let token = CancellationToken::new();
        {
            let _subscription = Subscription::new(token.clone());
        }
        assert!(token.is_cancelled());
    }
}
