//! Unit tests for `UserStore` registration and lookup.

use std::sync::Arc;

use oncall_relay::persistence::user_store::UserStore;
use oncall_relay::persistence::db;
use oncall_relay::AppError;

async fn store() -> UserStore {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    UserStore::new(database)
}

#[tokio::test]
async fn register_persists_all_fields() {
    let users = store().await;

    let user = users
        .register("Bilawal", "Hameed", "bil")
        .await
        .expect("register");

    assert_eq!(user.first_name, "Bilawal");
    assert_eq!(user.last_name, "Hameed");
    assert_eq!(user.slack_handle, "bil");
}

#[tokio::test]
async fn register_assigns_distinct_ids() {
    let users = store().await;

    let first = users.register("Ada", "Lovelace", "ada").await.expect("register");
    let second = users.register("Grace", "Hopper", "grace").await.expect("register");

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn register_rejects_empty_first_name() {
    let users = store().await;

    let err = users
        .register("", "Hameed", "bil")
        .await
        .expect_err("must reject");
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err}");
}

#[tokio::test]
async fn register_rejects_empty_last_name() {
    let users = store().await;

    let err = users
        .register("Bilawal", "", "bil")
        .await
        .expect_err("must reject");
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err}");
}

#[tokio::test]
async fn register_rejects_empty_slack_handle() {
    let users = store().await;

    let err = users
        .register("Bilawal", "Hameed", "")
        .await
        .expect_err("must reject");
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err}");
}

#[tokio::test]
async fn get_by_id_roundtrip() {
    let users = store().await;

    let registered = users
        .register("Bilawal", "Hameed", "bil")
        .await
        .expect("register");
    let fetched = users.get_by_id(registered.id).await.expect("get");

    assert_eq!(fetched, registered);
}

#[tokio::test]
async fn get_by_id_missing_is_not_found() {
    let users = store().await;

    let err = users.get_by_id(404).await.expect_err("must be missing");
    assert!(matches!(err, AppError::NotFound(_)), "got {err}");
}

#[tokio::test]
async fn list_all_returns_registered_users() {
    let users = store().await;

    let registered = users
        .register("Bilawal", "Hameed", "bil")
        .await
        .expect("register");
    let all = users.list_all().await.expect("list");

    assert_eq!(all, vec![registered]);
}
