use super::{decode_all, encode, report, Database};
use crate::errors::DataError;
use crate::models::{NewService, Service, ServiceUpdate};
use crate::store::{Direction, Query};

impl Database {
    /// Whole catalog, most recently created first
    pub async fn get_all_services(&self) -> Result<Vec<Service>, DataError> {
        let collection = self.collections().services.as_str();
        let query = Query::collection(collection).order_by("createdDate", Direction::Descending);

        let result: Result<Vec<Service>, DataError> = async {
            let documents = self.store.query(&query).await?;
            decode_all(collection, documents)
        }
        .await;

        report("Failed to fetch services", result)
    }

    /// Services open for requests, by name
    pub async fn get_active_services(&self) -> Result<Vec<Service>, DataError> {
        let collection = self.collections().services.as_str();
        let query = Query::collection(collection)
            .where_eq("isActive", true)
            .order_by("name", Direction::Ascending);

        let result: Result<Vec<Service>, DataError> = async {
            let documents = self.store.query(&query).await?;
            decode_all(collection, documents)
        }
        .await;

        report("Failed to fetch active services", result)
    }

    pub async fn add_service(&self, service: &NewService) -> Result<String, DataError> {
        let collection = self.collections().services.as_str();
        let result: Result<String, DataError> = async {
            let fields = encode(collection, service)?;
            Ok(self.store.add(collection, fields).await?)
        }
        .await;

        report("Failed to add service", result)
    }

    pub async fn update_service(&self, service_id: &str, update: &ServiceUpdate) -> Result<(), DataError> {
        let collection = self.collections().services.as_str();
        let result: Result<(), DataError> = async {
            let fields = encode(collection, update)?;
            self.store.update(collection, service_id, fields).await?;
            Ok(())
        }
        .await;

        report("Failed to update service", result)
    }

    /// Permanently remove a catalog entry. Deleting an unknown id succeeds.
    pub async fn delete_service(&self, service_id: &str) -> Result<(), DataError> {
        let collection = self.collections().services.as_str();
        let result = self
            .store
            .delete(collection, service_id)
            .await
            .map_err(DataError::from);

        report("Failed to delete service", result)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{NewService, ServiceUpdate};
    use crate::test_utils::TestContext;
    use serde_json::json;

    #[tokio::test]
    async fn test_all_services_newest_first() {
        let ctx = TestContext::new();
        ctx.seed("services", "s1", json!({"name": "Cleaning", "isActive": true, "createdDate": "2024-01-01T00:00:00.000Z"})).await;
        ctx.seed("services", "s2", json!({"name": "Gardening", "isActive": false, "createdDate": "2024-02-01T00:00:00.000Z"})).await;

        let services = ctx.db.get_all_services().await.unwrap();
        let ids: Vec<_> = services.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, vec!["s2", "s1"]);
    }

    #[tokio::test]
    async fn test_active_services_sorted_by_name() {
        let ctx = TestContext::new();
        ctx.db.add_service(&NewService::new("Plumbing")).await.unwrap();
        ctx.db.add_service(&NewService::new("Babysitting")).await.unwrap();
        ctx.db.add_service(&NewService::new("Cooking").inactive()).await.unwrap();

        let names: Vec<_> = ctx
            .db
            .get_active_services()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();

        assert_eq!(names, vec!["Babysitting", "Plumbing"]);
    }

    #[tokio::test]
    async fn test_delete_then_list_excludes_service() {
        let ctx = TestContext::new();
        let kept = ctx.db.add_service(&NewService::new("Cleaning")).await.unwrap();
        let removed = ctx.db.add_service(&NewService::new("Ironing")).await.unwrap();

        ctx.db.delete_service(&removed).await.unwrap();

        let services = ctx.db.get_all_services().await.unwrap();
        assert!(services.iter().all(|s| s.id != removed));
        assert!(services.iter().any(|s| s.id == kept));
    }

    #[tokio::test]
    async fn test_update_service_deactivates() {
        let ctx = TestContext::new();
        let id = ctx.db.add_service(&NewService::new("Cleaning")).await.unwrap();

        let update = ServiceUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        ctx.db.update_service(&id, &update).await.unwrap();

        assert!(ctx.db.get_active_services().await.unwrap().is_empty());
        let all = ctx.db.get_all_services().await.unwrap();
        assert_eq!(all[0].name, "Cleaning");
        assert!(!all[0].is_active);
    }
}
