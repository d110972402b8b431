//! HTTP middleware.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! The admin write guard is a `route_layer` on the API router.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalUser, RequireAdmin, clear_current_user, require_admin_for_writes, set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
