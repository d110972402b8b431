//! Integration tests for the supplier JSON API.
//!
//! These tests require a migrated `PostgreSQL` database.
//!
//! Run with: `cargo test -p simple-shop-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use simple_shop_integration_tests::TestServer;

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_supplier_lifecycle() {
    let server = TestServer::start().await;
    let name = format!("Supplier {}", uuid::Uuid::new_v4());

    let created = server
        .as_admin(server.client.post(server.url("/api/suppliers")))
        .await
        .json(&json!({
            "name": name,
            "contact": "+63 912 345 6789",
            "address": "12 Rizal Ave, Manila"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let supplier: Value = created.json().await.unwrap();
    assert!(supplier["createdAt"].is_string());
    let url = server.url(&format!("/api/suppliers/{}", supplier["id"]));

    // Partial update keeps the other fields.
    let updated = server
        .as_admin(server.client.put(&url))
        .await
        .json(&json!({ "contact": "ops@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let supplier: Value = updated.json().await.unwrap();
    assert_eq!(supplier["contact"], "ops@example.com");
    assert_eq!(supplier["name"], name.as_str());

    let deleted = server
        .as_admin(server.client.delete(&url))
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = server.client.get(&url).send().await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_supplier_create_requires_every_field() {
    let server = TestServer::start().await;

    let resp = server
        .as_admin(server.client.post(server.url("/api/suppliers")))
        .await
        .json(&json!({ "name": "Half a supplier", "contact": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"contact"));
    assert!(fields.contains(&"address"));
    assert!(!fields.contains(&"name"));
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_delete_missing_supplier_is_not_found() {
    let server = TestServer::start().await;

    let resp = server
        .as_admin(server.client.delete(server.url("/api/suppliers/2147483000")))
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
