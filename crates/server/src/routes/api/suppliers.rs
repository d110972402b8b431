//! Supplier API handlers.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use simple_shop_core::validation::SupplierInput;
use simple_shop_core::{Supplier, SupplierId};

use super::DeletedResponse;
use crate::db::SupplierRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the suppliers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/suppliers", get(index).post(create))
        .route(
            "/api/suppliers/{id}",
            get(show).put(update).delete(destroy),
        )
}

/// List suppliers, newest first.
///
/// # Errors
///
/// Returns 500 if the database fails.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>> {
    let suppliers = SupplierRepository::new(state.pool()).list().await?;
    Ok(Json(suppliers))
}

/// Create a supplier.
///
/// # Errors
///
/// Returns 400 if a field is missing.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<SupplierInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Supplier>)> {
    let Json(input) = body?;
    input.validate_create()?;

    let supplier = SupplierRepository::new(state.pool())
        .create(&input.normalized())
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Fetch one supplier.
///
/// # Errors
///
/// Returns 404 if the supplier does not exist.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<SupplierId>, PathRejection>,
) -> Result<Json<Supplier>> {
    let Path(id) = id?;
    SupplierRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Supplier not found".to_owned()))
}

/// Update the fields present in the body.
///
/// # Errors
///
/// Returns 400 if a present field is blank and 404 if the supplier does not
/// exist.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<SupplierId>, PathRejection>,
    body: std::result::Result<Json<SupplierInput>, JsonRejection>,
) -> Result<Json<Supplier>> {
    let Path(id) = id?;
    let Json(input) = body?;
    input.validate_update()?;

    let supplier = SupplierRepository::new(state.pool())
        .update(id, &input.normalized())
        .await?;
    Ok(Json(supplier))
}

/// Delete a supplier.
///
/// # Errors
///
/// Returns 404 if the supplier does not exist.
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    id: std::result::Result<Path<SupplierId>, PathRejection>,
) -> Result<Json<DeletedResponse>> {
    let Path(id) = id?;
    SupplierRepository::new(state.pool()).delete(id).await?;
    Ok(Json(DeletedResponse { message: "Deleted" }))
}
