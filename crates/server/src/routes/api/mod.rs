//! JSON API.
//!
//! Reads are public. Every other method passes through
//! [`require_admin_for_writes`].

pub mod products;
pub mod suppliers;

use axum::{Router, middleware};
use serde::Serialize;

use crate::middleware::require_admin_for_writes;
use crate::state::AppState;

/// Build the complete API router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(suppliers::router())
        .route_layer(middleware::from_fn_with_state(
            state,
            require_admin_for_writes,
        ))
}

/// Body of successful deletes.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}
