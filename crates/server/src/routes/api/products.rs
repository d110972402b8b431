//! Product API handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use simple_shop_core::validation::Validate;
use simple_shop_core::write::{ProductCreate, ProductUpdate};
use simple_shop_core::{Product, ProductFilter, ProductId};

use super::DeletedResponse;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(index).post(create))
        .route(
            "/api/products/{id}",
            get(show).put(update).delete(destroy),
        )
}

/// List products, newest first.
///
/// Accepts `q`, `tag`, `product_type` and `status` query filters.
///
/// # Errors
///
/// Returns 400 for an unparseable query and 500 if the database fails.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductFilter>, QueryRejection>,
) -> Result<Json<Vec<Product>>> {
    let Query(filter) = query?;
    let products = ProductRepository::new(state.pool())
        .list(&filter.normalized(), None, 0)
        .await?;
    Ok(Json(products))
}

/// Create a product with its images, variants and tags.
///
/// # Errors
///
/// Returns 400 if the body is malformed or fails validation.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<ProductCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    input.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(&input.normalized())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Fetch one product.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// Apply a nested-write update.
///
/// # Errors
///
/// Returns 400 if the body fails validation and 404 if the product does not
/// exist.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    body: std::result::Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let Json(input) = body?;
    input.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &input.normalized())
        .await?;
    Ok(Json(product))
}

/// Delete a product and its children.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<DeletedResponse>> {
    let Path(id) = id?;
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(Json(DeletedResponse {
        message: "Product deleted",
    }))
}
