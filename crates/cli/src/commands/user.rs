//! User role management.
//!
//! Roles are set out-of-band; the web app never changes them. A user must
//! have signed in once so their row exists.

use simple_shop_core::{Email, UserRole};
use simple_shop_server::db::{RepositoryError, UserRepository};

use super::{CommandError, connect};

/// Set the role of the user with `email`.
///
/// # Errors
///
/// Returns an error if the email is invalid, no such user exists, or the
/// update fails.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidEmail(e.to_string()))?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&email, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UnknownUser(email.to_string()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, email = %email, role = %user.role, "Role updated");
    Ok(())
}
