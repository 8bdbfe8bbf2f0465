use serde::{Deserialize, Serialize};

use super::StoredDate;
use crate::store::FieldMap;
use crate::utils::timestamps::now_iso;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<StoredDate>,
    #[serde(default)]
    pub read: bool,
    #[serde(flatten)]
    pub extra: FieldMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    /// Extra fields to store. Typed fields win over entries of the same name.
    #[serde(flatten)]
    pub extra: FieldMap,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub created_at: String,
    pub read: bool,
}

impl NewNotification {
    /// An unread notification created now
    pub fn new<U, T, M>(user_id: U, title: T, message: M) -> Self
    where
        U: Into<String>,
        T: Into<String>,
        M: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            created_at: now_iso(),
            read: false,
            extra: FieldMap::new(),
        }
    }

    pub fn created_at<S: Into<String>>(mut self, created_at: S) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn field<S: Into<String>, V: Into<serde_json::Value>>(mut self, name: S, value: V) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}
