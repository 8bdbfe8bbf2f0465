use serde::{Deserialize, Serialize};

use super::StoredDate;
use crate::store::FieldMap;
use crate::utils::timestamps::now_iso;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    /// Not reviewed yet; also assumed when the stored status is absent
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Outcome of an administrator's review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewDecision {
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl From<ReviewDecision> for RequestStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => RequestStatus::Approved,
            ReviewDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<StoredDate>,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_date: Option<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl ServiceRequest {
    pub fn is_reviewed(&self) -> bool {
        self.status != RequestStatus::Pending
    }
}

/// A stored `null` status reads as pending, like a missing one
fn status_or_pending<'de, D>(deserializer: D) -> Result<RequestStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<RequestStatus>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    /// Extra fields to store. Typed fields win over entries of the same name.
    #[serde(flatten)]
    pub extra: FieldMap,
    pub user_id: String,
    pub service_id: String,
    pub submission_date: String,
    pub status: RequestStatus,
}

impl NewServiceRequest {
    /// A pending request submitted now
    pub fn new<U: Into<String>, S: Into<String>>(user_id: U, service_id: S) -> Self {
        Self {
            user_id: user_id.into(),
            service_id: service_id.into(),
            submission_date: now_iso(),
            status: RequestStatus::Pending,
            extra: FieldMap::new(),
        }
    }

    pub fn submitted_at<S: Into<String>>(mut self, submission_date: S) -> Self {
        self.submission_date = submission_date.into();
        self
    }

    pub fn field<S: Into<String>, V: Into<serde_json::Value>>(mut self, name: S, value: V) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestUpdate {
    #[serde(flatten)]
    pub extra: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}
