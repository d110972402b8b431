//! Admin back-office route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin).

pub mod dashboard;
pub mod products;
pub mod suppliers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router, nested under `/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_form))
        .route("/products/{id}", get(products::show))
        .route(
            "/products/{id}/edit",
            get(products::edit_form).post(products::update),
        )
        .route("/products/{id}/delete", post(products::delete))
        .route("/suppliers", get(suppliers::index).post(suppliers::create))
        .route("/suppliers/new", get(suppliers::new_form))
        .route(
            "/suppliers/{id}",
            get(suppliers::show).post(suppliers::update),
        )
        .route("/suppliers/{id}/delete", post(suppliers::delete))
}
