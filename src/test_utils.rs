//! Test utilities for exercising the data access layer
//!
//! [`TestContext`] wires a [`Database`] to a fresh [`MemoryStore`],
//! [`FailingStore`] stands in for a store that rejects every request, and
//! [`capture_logs`] records the `tracing` events emitted while a test runs.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Config;
use crate::db::Database;
use crate::errors::StoreError;
use crate::store::{Document, DocumentStore, FieldMap, MemoryStore, Query, SnapshotCallback, Subscription};

/// A database over its own in-memory store
pub struct TestContext {
    pub db: Database,
    pub store: MemoryStore,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), Config::default())
    }

    pub fn with_store(store: MemoryStore, config: Config) -> Self {
        let db = Database::new(Arc::new(store.clone()), config);
        Self { db, store }
    }

    /// Write a raw document with a known id, bypassing the facade
    pub async fn seed(&self, collection: &str, id: &str, fields: Value) {
        self.store.insert_with_id(collection, id, object(fields)).await;
    }

    /// Seed a user profile, the way the authentication layer would
    pub async fn seed_user(&self, id: &str, fields: Value) {
        let collection = self.db.collections().users.clone();
        self.seed(&collection, id, fields).await;
    }

    /// Stored fields of a document, as the store holds them
    pub async fn raw(&self, collection: &str, id: &str) -> Option<FieldMap> {
        match self.store.get(collection, id).await {
            Ok(document) => document.map(|d| d.fields),
            Err(e) => panic!("memory store read failed: {}", e),
        }
    }
}

fn object(value: Value) -> FieldMap {
    match value {
        Value::Object(fields) => fields,
        other => panic!("seeded documents must be JSON objects, got {}", other),
    }
}

/// A store whose every request fails with the same error
pub struct FailingStore {
    error: StoreError,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(error: StoreError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>, StoreError> {
        self.fail()
    }

    async fn query(&self, _query: &Query) -> Result<Vec<Document>, StoreError> {
        self.fail()
    }

    async fn add(&self, _collection: &str, _fields: FieldMap) -> Result<String, StoreError> {
        self.fail()
    }

    async fn update(&self, _collection: &str, _id: &str, _fields: FieldMap) -> Result<(), StoreError> {
        self.fail()
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
        self.fail()
    }

    async fn listen(&self, _query: Query, _callback: SnapshotCallback) -> Result<Subscription, StoreError> {
        self.fail()
    }
}

/// A database whose store rejects everything with `error`
pub fn failing_database(error: StoreError) -> (Database, Arc<FailingStore>) {
    let store = Arc::new(FailingStore::new(error));
    let db = Database::new(store.clone(), Config::default());
    (db, store)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

/// Events recorded by [`capture_logs`]
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    pub fn events(&self) -> Vec<CapturedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Messages of the ERROR-level events
    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == Level::ERROR)
            .map(|e| e.message)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.logs.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
            });
        }
    }
}

/// Print log output for a test run, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Record every event emitted on this thread while the guard is alive.
///
/// Pair with a current-thread runtime (the `#[tokio::test]` default).
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer { logs: logs.clone() });
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
