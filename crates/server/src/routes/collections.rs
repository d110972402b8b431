//! Collection route handlers.
//!
//! A collection is every active product sharing a product type. Products
//! without one are listed under "Uncategorized".

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use simple_shop_core::{Product, ProductFilter, UNCATEGORIZED};

use crate::db::ProductRepository;
use crate::db::products::CollectionSummary;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Collection display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionView {
    pub name: String,
    pub href: String,
    pub product_count: i64,
}

impl From<CollectionSummary> for CollectionView {
    fn from(summary: CollectionSummary) -> Self {
        let name = summary
            .product_type
            .unwrap_or_else(|| UNCATEGORIZED.to_owned());
        Self {
            href: format!("/collections/{}", urlencoding::encode(&name)),
            name,
            product_count: summary.product_count,
        }
    }
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub collections: Vec<CollectionView>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub user: Option<CurrentUser>,
    pub name: String,
    pub products: Vec<Product>,
}

/// Display the collection listing.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<CollectionsIndexTemplate> {
    let collections = ProductRepository::new(state.pool())
        .collections()
        .await?
        .into_iter()
        .map(CollectionView::from)
        .collect();

    Ok(CollectionsIndexTemplate { user, collections })
}

/// Display every active product of one collection.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all, fields(product_type = %product_type))]
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(product_type): Path<String>,
) -> Result<Response> {
    let filter = ProductFilter::storefront(None, None, Some(product_type.clone()));
    let products = ProductRepository::new(state.pool())
        .list(&filter, None, 0)
        .await?;

    if products.is_empty() {
        return Ok(super::not_found_page(user));
    }

    Ok(CollectionShowTemplate {
        user,
        name: product_type,
        products,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_product_type_is_uncategorized() {
        let view = CollectionView::from(CollectionSummary {
            product_type: None,
            product_count: 2,
        });
        assert_eq!(view.name, "Uncategorized");
        assert_eq!(view.href, "/collections/Uncategorized");
    }

    #[test]
    fn test_collection_href_is_encoded() {
        let view = CollectionView::from(CollectionSummary {
            product_type: Some("Home & Kitchen".to_owned()),
            product_count: 1,
        });
        assert_eq!(view.href, "/collections/Home%20%26%20Kitchen");
    }
}
