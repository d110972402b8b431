//! Integration tests for Simple Shop.
//!
//! Each test starts the full application on a random local port against a
//! real, migrated database and talks to it over HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! export SHOP_DATABASE_URL=postgres://localhost/simple_shop_test
//! cargo run -p simple-shop-cli -- migrate
//! cargo test -p simple-shop-integration-tests -- --ignored
//! ```
//!
//! Sessions use an in-memory store so tests can sign in an admin without
//! going through an OAuth provider.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use sqlx::PgPool;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore};

use simple_shop_core::{Email, UserRole};
use simple_shop_server::config::{OAuthConfig, ShopConfig, database_url_from_env};
use simple_shop_server::db::{self, UserRepository};
use simple_shop_server::middleware::session::{SESSION_COOKIE_NAME, session_layer};
use simple_shop_server::models::{CurrentUser, OAuthProvider, ProviderIdentity, session_keys};
use simple_shop_server::state::AppState;

const TEST_SESSION_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%vD8";
const ADMIN_EMAIL: &str = "integration-admin@example.com";

/// A running application plus handles for setting up fixtures.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub pool: PgPool,
    store: MemoryStore,
}

impl TestServer {
    /// Bind a random port and serve the application on it.
    pub async fn start() -> Self {
        let database_url = database_url_from_env().expect("SHOP_DATABASE_URL must be set");
        let pool = db::create_pool(&database_url)
            .await
            .expect("Failed to connect to test database");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let base_url = format!("http://{addr}");

        let config = ShopConfig {
            database_url,
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            session_secret: TEST_SESSION_SECRET.into(),
            oauth: OAuthConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let store = MemoryStore::default();
        let app = simple_shop_server::app(
            AppState::new(config, pool.clone()),
            session_layer(store.clone(), false),
        );

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            pool,
            store,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Session cookie for a signed-in admin.
    ///
    /// Creates (or reuses) the admin user in the database and plants a session
    /// for them in the in-memory store.
    pub async fn admin_cookie(&self) -> String {
        let users = UserRepository::new(&self.pool);
        let identity = ProviderIdentity {
            provider: OAuthProvider::Google,
            provider_account_id: "integration-admin".to_owned(),
            email: Some(Email::parse(ADMIN_EMAIL).expect("valid email")),
            name: Some("Integration Admin".to_owned()),
            image: None,
        };
        let user = users
            .upsert_from_identity(&identity)
            .await
            .expect("Failed to create admin user");
        let email = user.email.clone().expect("admin has an email");
        let user = users
            .set_role(&email, UserRole::Admin)
            .await
            .expect("Failed to promote admin user");

        let current = CurrentUser::from(&user);
        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_owned(),
                serde_json::to_value(&current).expect("serializable user"),
            )]),
            expiry_date: OffsetDateTime::now_utc() + Duration::hours(1),
        };
        self.store
            .create(&mut record)
            .await
            .expect("Failed to store session");

        format!("{SESSION_COOKIE_NAME}={}", record.id)
    }

    /// Request builder carrying the admin session.
    pub async fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::COOKIE, self.admin_cookie().await)
    }
}

/// A valid product body with a unique title.
#[must_use]
pub fn product_body(title_prefix: &str) -> Value {
    serde_json::json!({
        "title": format!("{title_prefix} {}", uuid::Uuid::new_v4()),
        "body_html": "A product created by the integration tests, long enough to pass.",
        "vendor": "Integration Vendor",
        "product_type": "Integration",
        "images": [{ "src": "https://example.com/a.jpg", "alt": "A" }],
        "variants": [{ "title": "Default", "price": "19.99", "inventory_quantity": 3 }],
        "tags": [{ "name": "integration" }]
    })
}
