//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use simple_shop_core::{Email, UserId, UserRole};

use super::User;

/// Display name given to guest sign-ins.
pub const GUEST_NAME: &str = "Guest User";

/// Session-stored user identity.
///
/// Guests have no database row, so `id` is `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Option<UserId>,
    pub email: Option<Email>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub role: UserRole,
}

impl CurrentUser {
    /// A guest session, never backed by a database row.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: None,
            email: None,
            name: GUEST_NAME.to_owned(),
            image: None,
            role: UserRole::Default,
        }
    }

    /// Whether this user may use the back-office and write API.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.id.is_none()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        let name = user
            .name
            .clone()
            .or_else(|| user.email.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "Customer".to_owned());

        Self {
            id: Some(user.id),
            email: user.email.clone(),
            name,
            image: user.image.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the OAuth `state` parameter (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_has_no_id_and_no_admin_rights() {
        let guest = CurrentUser::guest();
        assert!(guest.is_guest());
        assert!(!guest.is_admin());
        assert_eq!(guest.name, "Guest User");
    }
}
