//! Postgres access for the shop.
//!
//! Every table lives in the `catalog` schema. Variants, images and tag links
//! are owned by their product and go with it on delete. Suppliers stand
//! alone. Users and their provider accounts back the sign-in flow, and
//! tower-sessions keeps its own `tower_sessions.session` table.
//!
//! The schema is created by `shop-cli migrate` from the SQL files in
//! `crates/server/migrations/`.

pub mod products;
pub mod suppliers;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use products::ProductRepository;
pub use suppliers::SupplierRepository;
pub use users::UserRepository;

/// Failure of a repository call.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value no longer passes its domain check.
    #[error("stored row is invalid: {0}")]
    DataCorruption(String),

    /// No row matched the id or key.
    #[error("not found")]
    NotFound,
}

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the shared pool used by the server, the CLI and the integration tests.
///
/// # Errors
///
/// Returns `sqlx::Error` if no connection can be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url.expose_secret())
        .await?;
    tracing::debug!(max_connections = MAX_CONNECTIONS, "Database pool ready");
    Ok(pool)
}
