use serde_json::{json, Value};
use tracing::debug;

use super::{decode_all, encode, report, Database};
use crate::errors::DataError;
use crate::models::{NewServiceRequest, RequestStatus, ReviewDecision, ServiceRequest, ServiceRequestUpdate};
use crate::store::{Direction, FieldMap, Query};
use crate::utils::timestamps::now_iso;

impl Database {
    /// Every request, most recently submitted first
    pub async fn get_all_service_requests(&self) -> Result<Vec<ServiceRequest>, DataError> {
        let collection = self.collections().service_requests.as_str();
        let query = Query::collection(collection).order_by("submissionDate", Direction::Descending);

        let result: Result<Vec<ServiceRequest>, DataError> = async {
            let documents = self.store.query(&query).await?;
            decode_all(collection, documents)
        }
        .await;

        report("Failed to fetch service requests", result)
    }

    /// Requests submitted by `user_id`, newest first
    pub async fn get_user_service_requests(&self, user_id: &str) -> Result<Vec<ServiceRequest>, DataError> {
        let collection = self.collections().service_requests.as_str();
        let query = self.owner_query::<ServiceRequest>(collection, user_id);
        let sort = self.owner_sort::<ServiceRequest>();

        let result: Result<Vec<ServiceRequest>, DataError> = async {
            let documents = self.store.query(&query).await?;
            let mut requests: Vec<ServiceRequest> = decode_all(collection, documents)?;
            if let Some(sort) = sort {
                sort(&mut requests);
            }
            Ok(requests)
        }
        .await;

        report("Failed to fetch user service requests", result)
    }

    pub async fn add_service_request(&self, request: &NewServiceRequest) -> Result<String, DataError> {
        let collection = self.collections().service_requests.as_str();
        let result: Result<String, DataError> = async {
            let fields = encode(collection, request)?;
            Ok(self.store.add(collection, fields).await?)
        }
        .await;

        report("Failed to add service request", result)
    }

    pub async fn update_service_request(
        &self,
        request_id: &str,
        update: &ServiceRequestUpdate,
    ) -> Result<(), DataError> {
        let collection = self.collections().service_requests.as_str();
        let result: Result<(), DataError> = async {
            let fields = encode(collection, update)?;
            self.store.update(collection, request_id, fields).await?;
            Ok(())
        }
        .await;

        report("Failed to update service request", result)
    }

    /// Record a review outcome.
    ///
    /// Writes `status`, `comments`, `reviewedBy` and `responseDate` together
    /// in a single merge. Absent comments or reviewer are stored as `null`.
    pub async fn update_request_status(
        &self,
        request_id: &str,
        decision: ReviewDecision,
        comments: Option<&str>,
        reviewed_by: Option<&str>,
    ) -> Result<(), DataError> {
        let collection = self.collections().service_requests.as_str();

        let mut fields = FieldMap::new();
        fields.insert("status".to_string(), json!(RequestStatus::from(decision)));
        fields.insert("comments".to_string(), comments.map_or(Value::Null, Value::from));
        fields.insert("reviewedBy".to_string(), reviewed_by.map_or(Value::Null, Value::from));
        fields.insert("responseDate".to_string(), Value::String(now_iso()));

        let result = self
            .store
            .update(collection, request_id, fields)
            .await
            .map_err(DataError::from);

        if result.is_ok() {
            debug!("Request {} marked {}", request_id, RequestStatus::from(decision));
        }
        report("Failed to update request status", result)
    }
}
