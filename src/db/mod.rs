//! Data access facade.
//!
//! [`Database`] exposes one async operation per entity and action. Each
//! operation issues a single request to the injected [`DocumentStore`],
//! decodes the returned documents into typed records, and on failure logs one
//! diagnostic before handing the error back unchanged.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::error;

use crate::config::{Collections, Config};
use crate::errors::DataError;
use crate::store::{Document, DocumentStore, FieldMap};

pub mod family_members;
pub mod notifications;
pub mod ordering;
pub mod service_requests;
pub mod services;
pub mod subscriptions;
pub mod users;

pub use subscriptions::{observer, Callbacks, SnapshotObserver};

/// Name of the owner reference field on owned records
pub(crate) const OWNER_FIELD: &str = "userId";

#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
    config: Config,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn collections(&self) -> &Collections {
        &self.config.collections
    }
}

/// Log a failed operation once and pass the result through untouched
pub(crate) fn report<T>(operation: &'static str, result: Result<T, DataError>) -> Result<T, DataError> {
    if let Err(e) = &result {
        error!(error_code = e.error_code(), "{}: {}", operation, e);
    }
    result
}

/// Convert a raw document into a typed record.
///
/// The record id always comes from the document id; an `id` key inside the
/// stored fields is ignored.
pub(crate) fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> Result<T, DataError> {
    let Document { id, mut fields } = document;
    fields.insert("id".to_string(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(|e| DataError::decode(collection, id, e))
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: &str,
    documents: Vec<Document>,
) -> Result<Vec<T>, DataError> {
    documents
        .into_iter()
        .map(|document| decode(collection, document))
        .collect()
}

/// Serialize an input into the field map sent to the store, minus any `id`
pub(crate) fn encode<T: Serialize>(collection: &str, value: &T) -> Result<FieldMap, DataError> {
    match serde_json::to_value(value).map_err(|e| DataError::encode(collection, e))? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(DataError::encode(
            collection,
            <serde_json::Error as serde::ser::Error>::custom(format!(
                "expected an object of fields, got {}",
                other
            )),
        )),
    }
}
