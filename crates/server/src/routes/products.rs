//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use simple_shop_core::{Product, ProductFilter, ProductId, ProductStatus};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Products per listing page.
pub const PER_PAGE: u32 = 12;

/// Tag button that clears the tag filter.
pub const ALL_TAGS: &str = "All";

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub page: Option<u32>,
}

/// Page arithmetic for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// Clamp `requested` into `1..=total_pages`. An empty listing has one page.
    #[must_use]
    pub fn new(total_items: i64, requested: Option<u32>) -> Self {
        let total = u32::try_from(total_items.max(0)).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(PER_PAGE).max(1);
        let current_page = requested.unwrap_or(1).clamp(1, total_pages);
        Self {
            current_page,
            total_pages,
        }
    }

    /// Rows to skip for the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.current_page - 1) * i64::from(PER_PAGE)
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<Product>,
    pub tags: Vec<String>,
    pub q: String,
    pub active_tag: String,
    pub pagination: Pagination,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

impl ProductsIndexTemplate {
    /// Link selecting `tag` while keeping the search.
    #[must_use]
    pub fn tag_href(&self, tag: &str) -> String {
        let mut href = String::from("/products?");
        if !self.q.is_empty() {
            href.push_str(&format!("q={}&", urlencoding::encode(&self.q)));
        }
        href.push_str(&format!("tag={}", urlencoding::encode(tag)));
        href
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<CurrentUser>,
    pub product: Product,
}

impl ProductShowTemplate {
    /// Listing filtered to one of this product's tags.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn tag_href(&self, name: &str) -> String {
        format!("/products?tag={}", urlencoding::encode(name))
    }

    /// This product's collection page.
    #[must_use]
    pub fn collection_href(&self) -> String {
        format!(
            "/collections/{}",
            urlencoding::encode(self.product.collection())
        )
    }
}

/// `q`/`tag` query string carried by pagination links, `&`-prefixed.
fn filter_query(filter: &ProductFilter) -> String {
    let mut query = String::new();
    if let Some(q) = &filter.q {
        query.push_str(&format!("&q={}", urlencoding::encode(q)));
    }
    if let Some(tag) = &filter.tag {
        query.push_str(&format!("&tag={}", urlencoding::encode(tag)));
    }
    query
}

/// Display product listing page.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<ProductsQuery>,
) -> Result<ProductsIndexTemplate> {
    let repo = ProductRepository::new(state.pool());
    let filter = ProductFilter::storefront(query.q, query.tag, None);

    let total = repo.count(&filter).await?;
    let pagination = Pagination::new(total, query.page);
    let products = repo
        .list(&filter, Some(i64::from(PER_PAGE)), pagination.offset())
        .await?;

    let mut tags = vec![ALL_TAGS.to_owned()];
    tags.extend(repo.tag_names().await?);

    let query_suffix = filter_query(&filter);
    let page_href = |page: u32| format!("/products?page={page}{query_suffix}");

    Ok(ProductsIndexTemplate {
        user,
        products,
        tags,
        previous_href: pagination
            .has_previous()
            .then(|| page_href(pagination.current_page - 1)),
        next_href: pagination
            .has_next()
            .then(|| page_href(pagination.current_page + 1)),
        q: filter.q.unwrap_or_default(),
        active_tag: filter.tag.unwrap_or_else(|| ALL_TAGS.to_owned()),
        pagination,
    })
}

/// Display product detail page. Drafts and archived products are not found.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Response> {
    let Ok(Path(id)) = id else {
        return Ok(super::not_found_page(user));
    };

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|p| p.status == ProductStatus::Active);

    Ok(match product {
        Some(product) => ProductShowTemplate { user, product }.into_response(),
        None => super::not_found_page(user),
    })
}
