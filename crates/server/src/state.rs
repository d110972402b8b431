//! Handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ShopConfig;
use crate::services::OAuthClient;

/// Shared by every route. The pool and the OAuth client are already
/// reference-counted, so only the configuration needs wrapping. Nothing
/// per-visitor lives here; that belongs in the session.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ShopConfig>,
    pool: PgPool,
    oauth: OAuthClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: ShopConfig, pool: PgPool) -> Self {
        let oauth = OAuthClient::new(&config);
        Self {
            config: Arc::new(config),
            pool,
            oauth,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Google and Facebook sign-in, limited to the providers with credentials.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }
}
