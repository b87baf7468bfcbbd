//! Integration tests for the `PostgreSQL` customer repository.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `CUSTOMERS_DATABASE_URL` pointing at it (migrations are applied here)
//!
//! Run with: `cargo test -p customers-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use sqlx::PgPool;

use customers_api::db::{self, CustomerRepository, PgCustomerRepository, RepositoryError};
use customers_core::{CustomerPatch, CustomerPayload, Email, NewCustomer, PageRequest};
use customers_integration_tests::{TestServer, customer_json};

async fn pool() -> PgPool {
    let url = std::env::var("CUSTOMERS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap();
    let pool = db::create_pool(&url, 5).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// Tag unique to this run, so tests can share one database.
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn new_customer(name: &str, tag: &str) -> NewCustomer {
    let payload: CustomerPayload = serde_json::from_value(customer_json(name, tag)).unwrap();
    payload.into_new_customer().unwrap()
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_insert_get_delete() {
    let repo = PgCustomerRepository::new(pool().await);
    let tag = unique("crud");

    let id = repo.insert(&new_customer("Jane Doe", &tag)).await.unwrap();
    let customer = repo.get(id).await.unwrap().unwrap();
    assert_eq!(customer.email.as_str(), format!("{tag}@example.com"));
    assert!(customer.region.is_none());

    assert!(repo.delete(id).await.unwrap());
    assert!(!repo.delete(id).await.unwrap());
    assert!(repo.get(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_unique_email_is_conflict() {
    let repo = PgCustomerRepository::new(pool().await);
    let tag = unique("dup");

    let id = repo.insert(&new_customer("Jane Doe", &tag)).await.unwrap();
    let err = repo
        .insert(&new_customer("Jane Again", &tag))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    repo.delete(id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_partial_update() {
    let repo = PgCustomerRepository::new(pool().await);
    let tag = unique("patch");

    let id = repo.insert(&new_customer("Jane Doe", &tag)).await.unwrap();
    let before = repo.get(id).await.unwrap().unwrap();

    let email = Email::parse(&format!("{tag}.new@example.com")).unwrap();
    let patch = CustomerPatch {
        email: Some(email.clone()),
        ..CustomerPatch::default()
    };
    repo.update(id, &patch).await.unwrap();

    let after = repo.get(id).await.unwrap().unwrap();
    assert_eq!(after.email, email);
    assert_eq!(after.name, before.name);
    assert_eq!(after.phone, before.phone);
    assert!(after.updated_at >= before.updated_at);

    repo.delete(id).await.unwrap();
    let err = repo.update(id, &patch).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_find_by_name_is_case_insensitive() {
    let repo = PgCustomerRepository::new(pool().await);
    let name = unique("Zed Quill");

    let id = repo.insert(&new_customer(&name, &unique("name"))).await.unwrap();
    let found = repo
        .find_by_name(&name.to_lowercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);

    repo.delete(id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_list_is_ordered_and_counted() {
    let repo = PgCustomerRepository::new(pool().await);
    let a = repo.insert(&new_customer("List A", &unique("la"))).await.unwrap();
    let b = repo.insert(&new_customer("List B", &unique("lb"))).await.unwrap();

    let total = repo.count().await.unwrap();
    assert!(total >= 2);

    let page = repo.list(PageRequest::new(1, 100)).await.unwrap();
    let ids: Vec<_> = page.iter().map(|c| c.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    repo.delete(a).await.unwrap();
    repo.delete(b).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_concurrent_duplicates_over_http() {
    let store: db::CustomerStore = Arc::new(PgCustomerRepository::new(pool().await));
    let server = TestServer::with_store(Arc::clone(&store)).await.unwrap();
    let http = reqwest::Client::new();
    let tag = unique("race");

    let mut tasks = Vec::new();
    for i in 0..8 {
        let http = http.clone();
        let url = server.url("/customers");
        let body = customer_json(&format!("Racer {i}"), &tag);
        tasks.push(tokio::spawn(async move {
            http.post(url).json(&body).send().await.unwrap().status()
        }));
    }

    let mut created = 0;
    for task in tasks {
        let status = task.await.unwrap();
        assert!(status == StatusCode::CREATED || status == StatusCode::CONFLICT);
        if status == StatusCode::CREATED {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    assert!(store.ping().await.is_ok());
    server.shutdown().await.unwrap();
    store.close().await;
}
