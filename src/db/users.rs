use serde_json::json;

use super::{decode, decode_all, encode, report, Database};
use crate::errors::DataError;
use crate::models::{User, UserStatus, UserUpdate};
use crate::store::{FieldMap, Query};

impl Database {
    pub async fn get_all_users(&self) -> Result<Vec<User>, DataError> {
        let collection = self.collections().users.as_str();
        let result: Result<Vec<User>, DataError> = async {
            let documents = self.store.query(&Query::collection(collection)).await?;
            decode_all(collection, documents)
        }
        .await;

        report("Failed to fetch users", result)
    }

    /// `Ok(None)` when no user document has this id
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, DataError> {
        let collection = self.collections().users.as_str();
        let result: Result<Option<User>, DataError> = async {
            match self.store.get(collection, user_id).await? {
                Some(document) => decode(collection, document).map(Some),
                None => Ok(None),
            }
        }
        .await;

        report("Failed to fetch user", result)
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<(), DataError> {
        let collection = self.collections().users.as_str();
        let result: Result<(), DataError> = async {
            let fields = encode(collection, update)?;
            self.store.update(collection, user_id, fields).await?;
            Ok(())
        }
        .await;

        report("Failed to update user", result)
    }

    /// Write only the `status` field
    pub async fn update_user_status(&self, user_id: &str, status: UserStatus) -> Result<(), DataError> {
        let collection = self.collections().users.as_str();
        let mut fields = FieldMap::new();
        fields.insert("status".to_string(), json!(status));

        let result = self
            .store
            .update(collection, user_id, fields)
            .await
            .map_err(DataError::from);

        report("Failed to update user status", result)
    }
}
