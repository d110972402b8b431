//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::products::CatalogCounts;
use crate::db::{ProductRepository, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub user: Option<CurrentUser>,
    pub counts: CatalogCounts,
    pub users: i64,
}

/// Display the admin dashboard with catalog totals.
///
/// # Errors
///
/// Returns an error if the counts cannot be read.
#[instrument(skip_all)]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<DashboardTemplate> {
    let counts = ProductRepository::new(state.pool()).counts().await?;
    let users = UserRepository::new(state.pool()).count().await?;

    Ok(DashboardTemplate {
        user: Some(admin),
        counts,
        users,
    })
}
