//! Admin supplier handlers. Plain urlencoded forms, no script.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use simple_shop_core::validation::SupplierInput;
use simple_shop_core::{Supplier, SupplierId};

use crate::db::{RepositoryError, SupplierRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Supplier table page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/suppliers/index.html")]
pub struct SuppliersIndexTemplate {
    pub user: Option<CurrentUser>,
    pub suppliers: Vec<Supplier>,
}

/// Supplier form; `supplier` is set when editing.
#[derive(Template, WebTemplate)]
#[template(path = "admin/suppliers/form.html")]
pub struct SupplierFormTemplate {
    pub user: Option<CurrentUser>,
    pub supplier: Option<Supplier>,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub error: Option<&'static str>,
}

impl SupplierFormTemplate {
    fn blank(admin: CurrentUser) -> Self {
        Self {
            user: Some(admin),
            supplier: None,
            name: String::new(),
            contact: String::new(),
            address: String::new(),
            error: None,
        }
    }

    fn for_supplier(admin: CurrentUser, supplier: Supplier) -> Self {
        Self {
            user: Some(admin),
            name: supplier.name.clone(),
            contact: supplier.contact.clone(),
            address: supplier.address.clone(),
            supplier: Some(supplier),
            error: None,
        }
    }

    /// Re-render with the submitted values and the first error.
    fn rejected(mut self, input: SupplierInput, error: &'static str) -> Response {
        self.name = input.name.unwrap_or_default();
        self.contact = input.contact.unwrap_or_default();
        self.address = input.address.unwrap_or_default();
        self.error = Some(error);
        (StatusCode::BAD_REQUEST, self).into_response()
    }

    /// Form action URL.
    #[must_use]
    pub fn action(&self) -> String {
        self.supplier
            .as_ref()
            .map_or_else(|| "/admin/suppliers".to_owned(), |s| format!("/admin/suppliers/{}", s.id))
    }
}

/// Display all suppliers, newest first.
///
/// # Errors
///
/// Returns an error if the suppliers cannot be read.
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<SuppliersIndexTemplate> {
    let suppliers = SupplierRepository::new(state.pool()).list().await?;
    Ok(SuppliersIndexTemplate {
        user: Some(admin),
        suppliers,
    })
}

/// Display the empty supplier form.
pub async fn new_form(RequireAdmin(admin): RequireAdmin) -> SupplierFormTemplate {
    SupplierFormTemplate::blank(admin)
}

/// Display one supplier as an editable form.
///
/// # Errors
///
/// Returns an error if the supplier cannot be read.
#[instrument(skip_all, fields(supplier_id = %id))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SupplierId>,
) -> Result<Response> {
    Ok(match SupplierRepository::new(state.pool()).get(id).await? {
        Some(supplier) => SupplierFormTemplate::for_supplier(admin, supplier).into_response(),
        None => crate::routes::not_found_page(Some(admin)),
    })
}

/// Create a supplier from the form.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(input): Form<SupplierInput>,
) -> Result<Response> {
    if let Err(errors) = input.validate_create() {
        return Ok(SupplierFormTemplate::blank(admin).rejected(input, errors.message()));
    }

    let supplier = SupplierRepository::new(state.pool())
        .create(&input.normalized())
        .await?;
    Ok(Redirect::to(&format!("/admin/suppliers/{}", supplier.id)).into_response())
}

/// Update a supplier from the form.
///
/// # Errors
///
/// Returns an error if the update fails.
#[instrument(skip_all, fields(supplier_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SupplierId>,
    Form(input): Form<SupplierInput>,
) -> Result<Response> {
    let repo = SupplierRepository::new(state.pool());

    if let Err(errors) = input.validate_create() {
        let Some(supplier) = repo.get(id).await? else {
            return Ok(crate::routes::not_found_page(Some(admin)));
        };
        return Ok(SupplierFormTemplate::for_supplier(admin, supplier)
            .rejected(input, errors.message()));
    }

    match repo.update(id, &input.normalized()).await {
        Ok(supplier) => Ok(Redirect::to(&format!("/admin/suppliers/{}", supplier.id)).into_response()),
        Err(RepositoryError::NotFound) => Ok(crate::routes::not_found_page(Some(admin))),
        Err(e) => Err(e.into()),
    }
}

/// Delete a supplier and return to the table.
///
/// # Errors
///
/// Returns 404 if the supplier does not exist.
#[instrument(skip_all, fields(supplier_id = %id))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SupplierId>,
) -> Result<Redirect> {
    SupplierRepository::new(state.pool()).delete(id).await?;
    Ok(Redirect::to("/admin/suppliers"))
}
