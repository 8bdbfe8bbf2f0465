use serde::{Deserialize, Serialize};

use super::StoredDate;
use crate::store::FieldMap;
use crate::utils::timestamps::now_iso;

/// A catalog entry users can request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<StoredDate>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    /// Extra fields to store. Typed fields win over entries of the same name.
    #[serde(flatten)]
    pub extra: FieldMap,
    pub name: String,
    pub is_active: bool,
    /// Catalog listings order on this field and skip services without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl NewService {
    /// An active service dated now
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            created_date: Some(now_iso()),
            extra: FieldMap::new(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn field<S: Into<String>, V: Into<serde_json::Value>>(mut self, name: S, value: V) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    #[serde(flatten)]
    pub extra: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
