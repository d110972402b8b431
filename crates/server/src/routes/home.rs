//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use simple_shop_core::{Product, ProductFilter};

use super::collections::CollectionView;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<Product>,
    pub collections: Vec<CollectionView>,
}

/// Display the home page: newest products and the collection list.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<HomeTemplate> {
    let repo = ProductRepository::new(state.pool());
    let filter = ProductFilter::storefront(None, None, None);

    let products = repo.list(&filter, Some(FEATURED_COUNT), 0).await?;
    let collections = repo
        .collections()
        .await?
        .into_iter()
        .map(CollectionView::from)
        .collect();

    Ok(HomeTemplate {
        user,
        products,
        collections,
    })
}
