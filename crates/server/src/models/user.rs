//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use simple_shop_core::{Email, UserId, UserRole};

/// A signed-in user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Absent when the provider did not share an email.
    pub email: Option<Email>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Supported social sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    /// Every provider, in sign-in page order.
    pub const ALL: [Self; 2] = [Self::Google, Self::Facebook];

    /// Path segment and stored provider name.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            _ => Err(format!("unknown sign-in provider: {s}")),
        }
    }
}

/// Identity returned by a provider after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub provider: OAuthProvider,
    /// The provider's stable user id.
    pub provider_account_id: String,
    pub email: Option<Email>,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_slug_round_trip() {
        for provider in OAuthProvider::ALL {
            assert_eq!(provider.slug().parse::<OAuthProvider>().unwrap(), provider);
        }
        assert!("github".parse::<OAuthProvider>().is_err());
    }
}
