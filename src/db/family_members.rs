use serde_json::Value;
use tracing::debug;

use super::{decode_all, encode, report, Database};
use crate::errors::DataError;
use crate::models::{FamilyMember, FamilyMemberUpdate, NewFamilyMember};
use crate::utils::timestamps::now_iso;

impl Database {
    /// Family members of `user_id`, newest first
    pub async fn get_family_members(&self, user_id: &str) -> Result<Vec<FamilyMember>, DataError> {
        let collection = self.collections().family_members.as_str();
        let query = self.owner_query::<FamilyMember>(collection, user_id);
        let sort = self.owner_sort::<FamilyMember>();

        let result: Result<Vec<FamilyMember>, DataError> = async {
            let documents = self.store.query(&query).await?;
            let mut members: Vec<FamilyMember> = decode_all(collection, documents)?;
            if let Some(sort) = sort {
                sort(&mut members);
            }
            Ok(members)
        }
        .await;

        report("Failed to fetch family members", result)
    }

    /// Insert a family member stamped with the current time as `createdAt`
    pub async fn add_family_member(&self, member: &NewFamilyMember) -> Result<String, DataError> {
        let collection = self.collections().family_members.as_str();
        let result: Result<String, DataError> = async {
            let mut fields = encode(collection, member)?;
            fields.insert("createdAt".to_string(), Value::String(now_iso()));
            Ok(self.store.add(collection, fields).await?)
        }
        .await;

        if let Ok(id) = &result {
            debug!("Added family member {} for user {}", id, member.user_id);
        }
        report("Failed to add family member", result)
    }

    pub async fn update_family_member(
        &self,
        member_id: &str,
        update: &FamilyMemberUpdate,
    ) -> Result<(), DataError> {
        let collection = self.collections().family_members.as_str();
        let result: Result<(), DataError> = async {
            let fields = encode(collection, update)?;
            self.store.update(collection, member_id, fields).await?;
            Ok(())
        }
        .await;

        report("Failed to update family member", result)
    }

    /// Permanently remove a family member. Deleting an unknown id succeeds.
    pub async fn delete_family_member(&self, member_id: &str) -> Result<(), DataError> {
        let collection = self.collections().family_members.as_str();
        let result = self
            .store
            .delete(collection, member_id)
            .await
            .map_err(DataError::from);

        report("Failed to delete family member", result)
    }
}
