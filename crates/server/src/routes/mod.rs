//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (database)
//!
//! # Storefront
//! GET  /products                      - Product listing (q, tag, page)
//! GET  /products/{id}                 - Product detail
//! GET  /collections                   - Collection listing
//! GET  /collections/{product_type}    - Collection detail
//!
//! # Auth
//! GET  /auth/signin                   - Sign-in page
//! GET  /auth/{provider}/login         - Redirect to Google / Facebook
//! GET  /auth/{provider}/callback      - Handle OAuth callback
//! POST /auth/guest                    - Guest sign-in
//! POST /auth/signout                  - Sign out
//!
//! # Admin (requires admin role)
//! GET  /admin                         - Dashboard
//! GET  /admin/products                - Product table
//! POST /admin/products                - Create from JSON product form
//! GET  /admin/products/new            - New product form
//! GET  /admin/products/{id}           - Product detail
//! GET  /admin/products/{id}/edit      - Edit form
//! POST /admin/products/{id}/edit      - Update from JSON product form
//! GET  /admin/suppliers               - Supplier table
//! POST /admin/suppliers               - Create supplier
//! GET  /admin/suppliers/new           - New supplier form
//! GET  /admin/suppliers/{id}          - Supplier detail / edit form
//! POST /admin/suppliers/{id}          - Update supplier
//! POST /admin/suppliers/{id}/delete   - Delete supplier
//!
//! # JSON API (writes require admin role)
//! GET|POST         /api/products
//! GET|PUT|DELETE   /api/products/{id}
//! GET|POST         /api/suppliers
//! GET|PUT|DELETE   /api/suppliers/{id}
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod collections;
pub mod health;
pub mod home;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", get(auth::signin_page))
        .route("/guest", post(auth::guest))
        .route("/signout", post(auth::signout))
        .route("/{provider}/login", get(auth::login))
        .route("/{provider}/callback", get(auth::callback))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{product_type}", get(collections::show))
}

/// Create all routes.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin::router())
        .merge(api::router(state))
        .fallback(fallback)
}

/// Not-found page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub user: Option<CurrentUser>,
}

/// Render the not-found page with a 404 status.
pub fn not_found_page(user: Option<CurrentUser>) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { user }).into_response()
}

async fn fallback(OptionalUser(user): OptionalUser) -> Response {
    not_found_page(user)
}
