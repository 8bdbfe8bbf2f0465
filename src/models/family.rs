use serde::{Deserialize, Serialize};

use super::StoredDate;
use crate::store::FieldMap;

/// A family member attached to a user's household.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stored creation date in whatever shape it was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<StoredDate>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// Input for a new family member. `createdAt` is stamped on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewFamilyMember {
    /// Extra fields to store. Typed fields win over entries of the same name.
    #[serde(flatten)]
    pub extra: FieldMap,
    pub user_id: String,
    pub name: String,
}

impl NewFamilyMember {
    pub fn new<U: Into<String>, N: Into<String>>(user_id: U, name: N) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            extra: FieldMap::new(),
        }
    }

    pub fn field<S: Into<String>, V: Into<serde_json::Value>>(mut self, name: S, value: V) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberUpdate {
    #[serde(flatten)]
    pub extra: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
