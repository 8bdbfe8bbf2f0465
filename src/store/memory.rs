use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Direction, Document, DocumentStore, FieldMap, Query, SnapshotCallback, Subscription};
use crate::errors::StoreError;

type Collections = HashMap<String, BTreeMap<String, FieldMap>>;

/// A composite index over one equality-filtered field and one ordered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeIndex {
    pub collection: String,
    pub filter_field: String,
    pub order_field: String,
}

impl CompositeIndex {
    pub fn new<S: Into<String>>(collection: S, filter_field: S, order_field: S) -> Self {
        Self {
            collection: collection.into(),
            filter_field: filter_field.into(),
            order_field: order_field.into(),
        }
    }
}

/// In-process document store with the observable contract of the managed
/// backend.
///
/// Documents are kept per collection in id order, which is also the order
/// unordered queries return them in. Ordered queries skip documents that
/// lack the order field. With index enforcement on, a query that combines
/// an equality filter with an ordering on a different field fails with
/// [`StoreError::FailedPrecondition`] unless a matching [`CompositeIndex`]
/// was declared.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    collections: RwLock<Collections>,
    listeners: Mutex<Vec<Arc<Listener>>>,
    next_listener_id: AtomicU64,
    /// `None` disables composite-index checks
    indexes: Option<Vec<CompositeIndex>>,
}

struct Listener {
    id: u64,
    query: Query,
    callback: SnapshotCallback,
    token: CancellationToken,
    last_delivered: Mutex<Option<Vec<Document>>>,
}

impl Listener {
    /// Invoke the callback if the result set differs from the last delivery
    fn deliver_if_changed(&self, documents: Vec<Document>) {
        if self.token.is_cancelled() {
            return;
        }

        if let Ok(mut last) = self.last_delivered.lock() {
            if last.as_ref() == Some(&documents) {
                return;
            }
            *last = Some(documents.clone());
        }

        (self.callback)(Ok(documents));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A store that rejects filter+order queries lacking a declared index
    pub fn with_index_enforcement(indexes: Vec<CompositeIndex>) -> Self {
        Self::build(Some(indexes))
    }

    fn build(indexes: Option<Vec<CompositeIndex>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                indexes,
            }),
        }
    }

    /// Write a document under a caller-chosen id, replacing any existing one.
    ///
    /// Used for records created outside this layer, such as user profiles
    /// keyed by their authentication id.
    pub async fn insert_with_id(&self, collection: &str, id: &str, fields: FieldMap) {
        let mut collections = self.inner.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        self.notify(&collections, collection);
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        let collections = self.inner.collections.read().await;
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    /// Number of listeners that are still attached
    pub fn listener_count(&self) -> usize {
        match self.inner.listeners.lock() {
            Ok(listeners) => listeners.len(),
            Err(_) => 0,
        }
    }

    /// Terminate every active listener with `error`.
    ///
    /// Each listener receives the error once and is then detached, the way
    /// the managed backend ends a listen stream after a server-side failure
    /// such as revoked permissions.
    pub fn fail_listeners(&self, error: StoreError) {
        let listeners = match self.inner.listeners.lock() {
            Ok(mut listeners) => std::mem::take(&mut *listeners),
            Err(_) => return,
        };

        warn!("Terminating {} listener(s): {}", listeners.len(), error);
        for listener in listeners {
            if listener.token.is_cancelled() {
                continue;
            }
            listener.token.cancel();
            (listener.callback)(Err(error.clone()));
        }
    }

    fn check_index(&self, query: &Query) -> Result<(), StoreError> {
        let (Some(indexes), Some(order)) = (&self.inner.indexes, &query.order_by) else {
            return Ok(());
        };

        for filter in query.filters.iter().filter(|f| f.field != order.field) {
            let indexed = indexes.iter().any(|index| {
                index.collection == query.collection
                    && index.filter_field == filter.field
                    && index.order_field == order.field
            });
            if !indexed {
                return Err(StoreError::failed_precondition(format!(
                    "The query requires an index on '{}' ({} ==, {} ordered)",
                    query.collection, filter.field, order.field
                )));
            }
        }

        Ok(())
    }

    fn active_listeners(&self, collection: &str) -> Vec<Arc<Listener>> {
        match self.inner.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .filter(|l| l.query.collection == collection && !l.token.is_cancelled())
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Push fresh snapshots to the listeners of `collection`.
    ///
    /// Runs while the caller still holds the collections lock so listeners
    /// observe writes in the order they were applied.
    fn notify(&self, collections: &Collections, collection: &str) {
        for listener in self.active_listeners(collection) {
            let documents = run_query(collections, &listener.query);
            listener.deliver_if_changed(documents);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.check_index(query)?;
        let collections = self.inner.collections.read().await;
        Ok(run_query(&collections, query))
    }

    async fn add(&self, collection: &str, fields: FieldMap) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.inner.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        self.notify(&collections, collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: FieldMap) -> Result<(), StoreError> {
        let mut collections = self.inner.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        for (key, value) in fields {
            document.insert(key, value);
        }

        self.notify(&collections, collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.inner.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();

        if removed {
            self.notify(&collections, collection);
        } else {
            debug!("Delete of missing document {}/{} ignored", collection, id);
        }
        Ok(())
    }

    async fn listen(&self, query: Query, callback: SnapshotCallback) -> Result<Subscription, StoreError> {
        self.check_index(&query)?;

        let token = CancellationToken::new();
        let listener = Arc::new(Listener {
            id: self.inner.next_listener_id.fetch_add(1, AtomicOrdering::Relaxed),
            query,
            callback,
            token: token.clone(),
            last_delivered: Mutex::new(None),
        });

        // Hold the read lock across registration and the initial snapshot so
        // no write can slip in between the two.
        let collections = self.inner.collections.read().await;
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push(listener.clone());
        }
        listener.deliver_if_changed(run_query(&collections, &listener.query));
        drop(collections);

        let registry: Weak<Inner> = Arc::downgrade(&self.inner);
        let listener_id = listener.id;
        Ok(Subscription::with_cleanup(token, move || {
            if let Some(inner) = registry.upgrade() {
                if let Ok(mut listeners) = inner.listeners.lock() {
                    listeners.retain(|l| l.id != listener_id);
                }
            }
        }))
    }
}

fn run_query(collections: &Collections, query: &Query) -> Vec<Document> {
    let Some(documents) = collections.get(&query.collection) else {
        return Vec::new();
    };

    let mut results: Vec<Document> = documents
        .iter()
        .map(|(id, fields)| Document::new(id.as_str(), fields.clone()))
        .filter(|document| query.matches(document))
        .collect();

    if let Some(order) = &query.order_by {
        results.retain(|document| document.fields.contains_key(&order.field));
        results.sort_by(|a, b| {
            let ordering = compare_values(&a.fields[&order.field], &b.fields[&order.field]);
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }

    results
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Cross-type value ordering: null < bool < number < string < array < map
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_values(l, r))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
