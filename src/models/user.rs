use serde::{Deserialize, Serialize};

use crate::store::FieldMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "suspended")]
    Suspended,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// A user profile. Only `status` is interpreted here; every other profile
/// field is carried as-is in `profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(flatten)]
    pub profile: FieldMap,
}

impl User {
    pub fn is_suspended(&self) -> bool {
        self.status == Some(UserStatus::Suspended)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserUpdate {
    /// Profile fields to merge; `status` wins over a profile entry of that name
    #[serde(flatten)]
    pub profile: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl UserUpdate {
    pub fn field<S: Into<String>, V: Into<serde_json::Value>>(mut self, name: S, value: V) -> Self {
        self.profile.insert(name.into(), value.into());
        self
    }
}
