use std::sync::{Arc, Mutex};

use household_data::models::{NewFamilyMember, NewServiceRequest, ServiceRequest};
use household_data::store::{CompositeIndex, MemoryStore};
use household_data::test_utils::TestContext;
use household_data::{observer, Config, DataError, OwnerQueryStrategy, StoreError};
use serde_json::json;

fn strict_store() -> MemoryStore {
    MemoryStore::with_index_enforcement(vec![CompositeIndex::new("notifications", "userId", "createdAt")])
}

#[tokio::test]
async fn test_query_then_sort_needs_no_index() {
    let ctx = TestContext::with_store(strict_store(), Config::default());
    ctx.seed("familyMembers", "m1", json!({"userId": "u1", "name": "Old", "createdAt": "2023-05-01T10:00:00.000Z"})).await;
    ctx.seed("familyMembers", "m2", json!({"userId": "u1", "name": "Undated"})).await;
    ctx.db.add_family_member(&NewFamilyMember::new("u1", "New")).await.unwrap();

    let names: Vec<_> = ctx
        .db
        .get_family_members("u1")
        .await
        .unwrap()
        .into_iter()
        .filter_map(|m| m.name)
        .collect();

    // Undated records sort as the oldest
    assert_eq!(names, vec!["New", "Old", "Undated"]);
}

#[tokio::test]
async fn test_composite_index_strategy_requires_the_index() {
    let config = Config::default().with_owner_query_strategy(OwnerQueryStrategy::CompositeIndex);
    let ctx = TestContext::with_store(strict_store(), config);
    ctx.db.add_service_request(&NewServiceRequest::new("u1", "s1")).await.unwrap();

    let err = ctx.db.get_user_service_requests("u1").await.unwrap_err();
    assert!(matches!(err, DataError::Store(StoreError::FailedPrecondition { .. })));

    let err = ctx
        .db
        .subscribe_to_user_requests("u1", |_: Vec<ServiceRequest>| {})
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "STORE_FAILED_PRECONDITION");
    assert_eq!(ctx.store.listener_count(), 0);
}

#[tokio::test]
async fn test_notifications_use_their_declared_index() {
    let ctx = TestContext::with_store(strict_store(), Config::default());
    ctx.seed("notifications", "n1", json!({"userId": "u1", "title": "Hi", "createdAt": "2024-01-01T00:00:00.000Z"})).await;

    let notifications = ctx.db.get_user_notifications("u1").await.unwrap();

    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].id, "n1");
}

#[tokio::test]
async fn test_non_string_dates_do_not_break_owner_reads_or_snapshots() {
    let ctx = TestContext::new();
    ctx.seed("serviceRequests", "r1", json!({"userId": "u1", "submissionDate": 1700000000000_i64})).await;
    ctx.seed("serviceRequests", "r2", json!({"userId": "u1", "submissionDate": {"seconds": 1710000000, "nanoseconds": 0}})).await;
    ctx.seed("serviceRequests", "r3", json!({"userId": "u1", "submissionDate": false})).await;

    let ids: Vec<_> = ctx
        .db
        .get_user_service_requests("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["r2", "r1", "r3"]);

    let latest: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = latest.clone();
    let _subscription = ctx
        .db
        .subscribe_to_user_requests(
            "u1",
            observer(
                move |requests: Vec<ServiceRequest>| *sink.lock().unwrap() = requests.into_iter().map(|r| r.id).collect(),
                |e: DataError| panic!("snapshot failed: {}", e),
            ),
        )
        .await
        .unwrap();

    assert_eq!(latest.lock().unwrap().clone(), vec!["r2", "r1", "r3"]);
}
