use serde_json::Value;

use super::{decode_all, encode, report, Database, OWNER_FIELD};
use crate::errors::DataError;
use crate::models::{NewNotification, Notification};
use crate::store::{Direction, FieldMap, Query};

impl Database {
    pub(crate) fn user_notifications_query(&self, user_id: &str) -> Query {
        Query::collection(self.collections().notifications.as_str())
            .where_eq(OWNER_FIELD, user_id)
            .order_by("createdAt", Direction::Descending)
    }

    /// Notifications of `user_id`, newest first.
    ///
    /// Ordered by the store, so it needs a (userId, createdAt) composite index
    /// where the backend enforces them.
    pub async fn get_user_notifications(&self, user_id: &str) -> Result<Vec<Notification>, DataError> {
        let collection = self.collections().notifications.as_str();
        let query = self.user_notifications_query(user_id);

        let result: Result<Vec<Notification>, DataError> = async {
            let documents = self.store.query(&query).await?;
            decode_all(collection, documents)
        }
        .await;

        report("Failed to fetch notifications", result)
    }

    pub async fn add_notification(&self, notification: &NewNotification) -> Result<String, DataError> {
        let collection = self.collections().notifications.as_str();
        let result: Result<String, DataError> = async {
            let fields = encode(collection, notification)?;
            Ok(self.store.add(collection, fields).await?)
        }
        .await;

        report("Failed to add notification", result)
    }

    pub async fn mark_notification_as_read(&self, notification_id: &str) -> Result<(), DataError> {
        let collection = self.collections().notifications.as_str();
        let mut fields = FieldMap::new();
        fields.insert("read".to_string(), Value::Bool(true));

        let result = self
            .store
            .update(collection, notification_id, fields)
            .await
            .map_err(DataError::from);

        report("Failed to mark notification as read", result)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::NewNotification;
    use crate::test_utils::TestContext;
    use serde_json::json;

    #[tokio::test]
    async fn test_notifications_for_owner_newest_first() {
        let ctx = TestContext::new();
        ctx.db
            .add_notification(&NewNotification::new("u1", "Welcome", "Hi").created_at("2024-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        ctx.db
            .add_notification(&NewNotification::new("u1", "Approved", "Your request").created_at("2024-02-01T00:00:00.000Z"))
            .await
            .unwrap();
        ctx.db
            .add_notification(&NewNotification::new("u2", "Other", "Not yours"))
            .await
            .unwrap();

        let titles: Vec<_> = ctx
            .db
            .get_user_notifications("u1")
            .await
            .unwrap()
            .into_iter()
            .filter_map(|n| n.title)
            .collect();

        assert_eq!(titles, vec!["Approved", "Welcome"]);
    }

    #[tokio::test]
    async fn test_new_notification_is_unread_whatever_the_extras_say() {
        let ctx = TestContext::new();
        let id = ctx
            .db
            .add_notification(&NewNotification::new("u1", "Hi", "There").field("read", true).field("userId", "u9"))
            .await
            .unwrap();

        let raw = ctx.raw("notifications", &id).await.unwrap();
        assert_eq!(raw.get("read"), Some(&json!(false)));
        assert_eq!(raw.get("userId"), Some(&json!("u1")));
    }

    #[tokio::test]
    async fn test_mark_notification_as_read() {
        let ctx = TestContext::new();
        let id = ctx
            .db
            .add_notification(&NewNotification::new("u1", "Reminder", "Visit tomorrow").field("kind", "reminder"))
            .await
            .unwrap();

        ctx.db.mark_notification_as_read(&id).await.unwrap();

        let notification = ctx.db.get_user_notifications("u1").await.unwrap().remove(0);
        assert!(notification.read);
        assert_eq!(notification.message.as_deref(), Some("Visit tomorrow"));
        assert_eq!(notification.extra.get("kind"), Some(&json!("reminder")));
    }
}
