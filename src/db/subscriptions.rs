//! Standing change subscriptions.
//!
//! Every snapshot from the store is decoded (and re-sorted for owner-filtered
//! queries) and handed to a [`SnapshotObserver`] as the complete current
//! result set. Store failures and malformed documents go to
//! [`SnapshotObserver::on_error`] instead.

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::{decode_all, report, Database};
use crate::errors::DataError;
use crate::models::{Notification, ServiceRequest};
use crate::store::{Direction, Query, SnapshotCallback, Subscription};

/// Receiver of subscription snapshots.
///
/// Any `Fn(Vec<T>)` closure is an observer that ignores errors; use
/// [`observer`] to handle both slots.
pub trait SnapshotObserver<T>: Send + Sync + 'static {
    fn on_snapshot(&self, records: Vec<T>);

    fn on_error(&self, _error: DataError) {}
}

impl<T, F> SnapshotObserver<T> for F
where
    F: Fn(Vec<T>) + Send + Sync + 'static,
{
    fn on_snapshot(&self, records: Vec<T>) {
        self(records)
    }
}

/// Observer built from a snapshot closure and an error closure
pub struct Callbacks<N, E> {
    on_snapshot: N,
    on_error: E,
}

pub fn observer<N, E>(on_snapshot: N, on_error: E) -> Callbacks<N, E> {
    Callbacks { on_snapshot, on_error }
}

impl<T, N, E> SnapshotObserver<T> for Callbacks<N, E>
where
    N: Fn(Vec<T>) + Send + Sync + 'static,
    E: Fn(DataError) + Send + Sync + 'static,
{
    fn on_snapshot(&self, records: Vec<T>) {
        (self.on_snapshot)(records)
    }

    fn on_error(&self, error: DataError) {
        (self.on_error)(error)
    }
}

impl Database {
    /// Live view of the requests of `user_id`, newest first
    pub async fn subscribe_to_user_requests<O>(&self, user_id: &str, observer: O) -> Result<Subscription, DataError>
    where
        O: SnapshotObserver<ServiceRequest>,
    {
        let collection = self.collections().service_requests.as_str();
        let query = self.owner_query::<ServiceRequest>(collection, user_id);
        let sort = self.owner_sort::<ServiceRequest>();

        self.subscribe::<ServiceRequest, O>("Failed to subscribe to user requests", query, sort, observer)
            .await
    }

    /// Live view of every request, most recently submitted first
    pub async fn subscribe_to_all_requests<O>(&self, observer: O) -> Result<Subscription, DataError>
    where
        O: SnapshotObserver<ServiceRequest>,
    {
        let query = Query::collection(self.collections().service_requests.as_str())
            .order_by("submissionDate", Direction::Descending);

        self.subscribe::<ServiceRequest, O>("Failed to subscribe to requests", query, None, observer)
            .await
    }

    /// Live view of the notifications of `user_id`, newest first
    pub async fn subscribe_to_user_notifications<O>(
        &self,
        user_id: &str,
        observer: O,
    ) -> Result<Subscription, DataError>
    where
        O: SnapshotObserver<Notification>,
    {
        let query = self.user_notifications_query(user_id);

        self.subscribe::<Notification, O>("Failed to subscribe to notifications", query, None, observer)
            .await
    }

    async fn subscribe<T, O>(
        &self,
        operation: &'static str,
        query: Query,
        sort: Option<fn(&mut [T])>,
        observer: O,
    ) -> Result<Subscription, DataError>
    where
        T: DeserializeOwned + 'static,
        O: SnapshotObserver<T>,
    {
        let collection = query.collection.clone();
        let callback: SnapshotCallback = Box::new(move |snapshot| {
            let records = snapshot
                .map_err(DataError::from)
                .and_then(|documents| decode_all::<T>(&collection, documents));

            match records {
                Ok(mut records) => {
                    if let Some(sort) = sort {
                        sort(&mut records);
                    }
                    debug!("Delivering {} record(s) from '{}'", records.len(), collection);
                    observer.on_snapshot(records);
                }
                Err(e) => {
                    error!(error_code = e.error_code(), "Subscription on '{}' failed: {}", collection, e);
                    observer.on_error(e);
                }
            }
        });

        let result = self
            .store
            .listen(query, callback)
            .await
            .map_err(DataError::from);

        report(operation, result)
    }
}
