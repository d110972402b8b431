//! Admin product handlers.
//!
//! The product form page posts its state as JSON ([`ProductForm`]). Saving
//! validates with the shared contract, then creates the product or applies a
//! full-replacement nested write.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::instrument;

use simple_shop_core::form::ProductForm;
use simple_shop_core::validation::{MIN_DESCRIPTION_CHARS, Validate};
use simple_shop_core::{Product, ProductFilter, ProductId};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Product table page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<Product>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<CurrentUser>,
    pub product: Product,
}

/// New/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub user: Option<CurrentUser>,
    pub heading: String,
    /// Where the form JSON is posted.
    pub action: String,
    pub form: ProductForm,
    pub min_description: usize,
}

impl ProductFormTemplate {
    fn new(admin: CurrentUser, heading: String, action: String, form: ProductForm) -> Self {
        Self {
            user: Some(admin),
            heading,
            action,
            form,
            min_description: MIN_DESCRIPTION_CHARS,
        }
    }
}

/// Response to a successful form save.
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub id: ProductId,
    pub redirect: String,
}

impl SavedResponse {
    fn for_product(id: ProductId) -> Self {
        Self {
            id,
            redirect: format!("/admin/products/{id}"),
        }
    }
}

/// Display every product, newest first, regardless of status.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<ProductsIndexTemplate> {
    let products = ProductRepository::new(state.pool())
        .list(&ProductFilter::default(), None, 0)
        .await?;

    Ok(ProductsIndexTemplate {
        user: Some(admin),
        products,
    })
}

/// Display one product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool()).get(id).await?;

    Ok(match product {
        Some(product) => ProductShowTemplate {
            user: Some(admin),
            product,
        }
        .into_response(),
        None => crate::routes::not_found_page(Some(admin)),
    })
}

/// Display the empty product form.
pub async fn new_form(RequireAdmin(admin): RequireAdmin) -> ProductFormTemplate {
    ProductFormTemplate::new(
        admin,
        "New product".to_owned(),
        "/admin/products".to_owned(),
        ProductForm::blank(),
    )
}

/// Display the product form pre-filled from a stored product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn edit_form(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool()).get(id).await? else {
        return Ok(crate::routes::not_found_page(Some(admin)));
    };

    Ok(ProductFormTemplate::new(
        admin,
        format!("Edit {}", product.title),
        format!("/admin/products/{id}/edit"),
        ProductForm::from_product(&product),
    )
    .into_response())
}

/// Create a product from the JSON form.
///
/// # Errors
///
/// Returns 400 with field errors if the form fails validation.
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    body: std::result::Result<Json<ProductForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedResponse>)> {
    let Json(form) = body?;
    form.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(&form.to_create())
        .await?;

    Ok((StatusCode::CREATED, Json(SavedResponse::for_product(product.id))))
}

/// Replace a product's fields and children from the JSON form.
///
/// # Errors
///
/// Returns 400 with field errors if the form fails validation and 404 if the
/// product no longer exists.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    body: std::result::Result<Json<ProductForm>, JsonRejection>,
) -> Result<Json<SavedResponse>> {
    let Json(form) = body?;
    form.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &form.to_update())
        .await?;

    Ok(Json(SavedResponse::for_product(product.id)))
}

/// Delete a product and everything it owns.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(Redirect::to("/admin/products"))
}
