//! External service clients.

pub mod oauth;

pub use oauth::{OAuthClient, OAuthError};
