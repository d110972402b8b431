//! Domain models for users and sessions.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{OAuthProvider, ProviderIdentity, User};
