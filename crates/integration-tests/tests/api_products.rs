//! Integration tests for the product JSON API.
//!
//! These tests require a migrated `PostgreSQL` database.
//!
//! Run with: `cargo test -p simple-shop-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use simple_shop_integration_tests::{TestServer, product_body};

async fn create_product(server: &TestServer, body: &Value) -> Value {
    let resp = server
        .as_admin(server.client.post(server.url("/api/products")))
        .await
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn fetch_product(server: &TestServer, id: &Value) -> (StatusCode, Value) {
    let resp = server
        .client
        .get(server.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

// =============================================================================
// Create / Read
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_created_product_has_variants() {
    let server = TestServer::start().await;
    let created = create_product(&server, &product_body("Created")).await;

    let (status, product) = fetch_product(&server, &created["id"]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!product["variants"].as_array().unwrap().is_empty());
    assert_eq!(product["images"].as_array().unwrap().len(), 1);
    assert_eq!(product["tags"][0]["name"], "integration");
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_reads_are_public_and_writes_are_not() {
    let server = TestServer::start().await;

    let list = server
        .client
        .get(server.url("/api/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::OK);

    let write = server
        .client
        .post(server.url("/api/products"))
        .json(&product_body("Anonymous"))
        .send()
        .await
        .unwrap();
    assert_eq!(write.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_price_must_be_positive() {
    let server = TestServer::start().await;

    let mut cheapest = product_body("Cheapest");
    cheapest["variants"][0]["price"] = json!("0.01");
    create_product(&server, &cheapest).await;

    let mut free = product_body("Free");
    free["variants"][0]["price"] = json!("0");
    let resp = server
        .as_admin(server.client.post(server.url("/api/products")))
        .await
        .json(&free)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_description_minimum_length() {
    let server = TestServer::start().await;

    let mut short = product_body("Short");
    short["body_html"] = json!("x".repeat(49));
    let resp = server
        .as_admin(server.client.post(server.url("/api/products")))
        .await
        .json(&short)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut exact = product_body("Exact");
    exact["body_html"] = json!("x".repeat(50));
    create_product(&server, &exact).await;
}

// =============================================================================
// Nested writes
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_image_update_replaces_whole_set() {
    let server = TestServer::start().await;
    let created = create_product(&server, &product_body("Images")).await;
    let id = &created["id"];

    let update = json!({
        "images": {
            "deleteMany": {},
            "create": [
                { "src": "https://example.com/b.jpg", "alt": "B" },
                { "src": "https://example.com/c.jpg", "alt": "C" }
            ]
        }
    });
    let resp = server
        .as_admin(server.client.put(server.url(&format!("/api/products/{id}"))))
        .await
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, product) = fetch_product(&server, id).await;
    let srcs: Vec<&str> = product["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["src"].as_str().unwrap())
        .collect();
    assert_eq!(
        srcs,
        ["https://example.com/b.jpg", "https://example.com/c.jpg"]
    );
    // Untouched collections survive.
    assert_eq!(product["variants"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_delete_then_delete_again() {
    let server = TestServer::start().await;
    let created = create_product(&server, &product_body("Doomed")).await;
    let url = server.url(&format!("/api/products/{}", created["id"]));

    let first = server
        .as_admin(server.client.delete(&url))
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["message"], "Product deleted");

    let second = server
        .as_admin(server.client.delete(&url))
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    let (status, _) = fetch_product(&server, &created["id"]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Filtering
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_unknown_tag_filter_is_empty() {
    let server = TestServer::start().await;
    create_product(&server, &product_body("Tagged")).await;

    let tag = uuid::Uuid::new_v4().to_string();
    let resp = server
        .client
        .get(server.url("/api/products"))
        .query(&[("tag", tag.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Value = resp.json().await.unwrap();
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_admin_page_deletes_product() {
    let server = TestServer::start().await;
    let created = create_product(&server, &product_body("Back-office delete")).await;
    let id = &created["id"];

    let resp = server
        .as_admin(server.client.post(server.url(&format!("/admin/products/{id}/delete"))))
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[reqwest::header::LOCATION], "/admin/products");

    let (status, _) = fetch_product(&server, id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a migrated PostgreSQL database (SHOP_DATABASE_URL)"]
async fn test_price_above_column_range_is_rejected() {
    let server = TestServer::start().await;

    let mut huge = product_body("Huge");
    huge["variants"][0]["price"] = json!("100000000000");
    let resp = server
        .as_admin(server.client.post(server.url("/api/products")))
        .await
        .json(&huge)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Price must be at most 9999999999.99");
}
