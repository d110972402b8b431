//! Server configuration, read from the process environment (and `.env`).
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `SHOP_DATABASE_URL` (or `DATABASE_URL`) | yes | |
//! | `SHOP_BASE_URL` | yes | |
//! | `SHOP_SESSION_SECRET` | yes | |
//! | `SHOP_HOST` | no | `127.0.0.1` |
//! | `SHOP_PORT` | no | `3000` |
//! | `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` | no | |
//! | `FACEBOOK_CLIENT_ID`, `FACEBOOK_CLIENT_SECRET` | no | |
//! | `SENTRY_DSN`, `SENTRY_ENVIRONMENT` | no | |
//!
//! `SHOP_BASE_URL` is the public origin; OAuth callback URLs are built from
//! it. A sign-in provider is switched on by setting both of its variables.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Environment variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "SHOP_DATABASE_URL";
const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3000;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that give away a copy-pasted sample secret.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "replace",
    "xxx",
    "todo",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public origin without a trailing slash.
    pub base_url: String,
    /// Signs the session cookie.
    pub session_secret: SecretString,
    pub oauth: OAuthConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Sign-in providers that have credentials. `None` means the button is hidden.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub google: Option<ProviderCredentials>,
    pub facebook: Option<ProviderCredentials>,
}

#[derive(Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ShopConfig {
    /// Read the configuration, loading `.env` first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing, a value
    /// does not parse, or a secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(&Env::process())
    }

    fn from_source(env: &Env) -> Result<Self, ConfigError> {
        let session_secret = env.required("SHOP_SESSION_SECRET")?;
        check_session_secret("SHOP_SESSION_SECRET", &session_secret)?;

        Ok(Self {
            database_url: env.database_url()?,
            host: env.parsed("SHOP_HOST", DEFAULT_HOST)?,
            port: env.parsed("SHOP_PORT", DEFAULT_PORT)?,
            base_url: parse_base_url(&env.required("SHOP_BASE_URL")?)?,
            session_secret: SecretString::from(session_secret),
            oauth: OAuthConfig {
                google: env.provider("GOOGLE")?,
                facebook: env.provider("FACEBOOK")?,
            },
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Cookies get the `Secure` flag when the public origin is https.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Only the database URL, for the CLI and the integration tests.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `SHOP_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    dotenvy::dotenv().ok();
    Env::process().database_url()
}

/// Snapshot of the variables a config is built from. Blank values count as
/// unset.
struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    fn process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .collect(),
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.vars.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        }
    }

    fn database_url(&self) -> Result<SecretString, ConfigError> {
        self.optional(DATABASE_URL_VAR)
            .or_else(|| self.optional(FALLBACK_DATABASE_URL_VAR))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(DATABASE_URL_VAR.to_owned()))
    }

    /// `{PREFIX}_CLIENT_ID` plus `{PREFIX}_CLIENT_SECRET`. Setting only one of
    /// the two is a mistake, not a disabled provider.
    fn provider(&self, prefix: &str) -> Result<Option<ProviderCredentials>, ConfigError> {
        let id_key = format!("{prefix}_CLIENT_ID");
        let secret_key = format!("{prefix}_CLIENT_SECRET");

        match (self.optional(&id_key), self.optional(&secret_key)) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(secret_key)),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(id_key)),
            (Some(client_id), Some(secret)) => {
                check_secret_strength(&secret_key, &secret)?;
                Ok(Some(ProviderCredentials {
                    client_id,
                    client_secret: SecretString::from(secret),
                }))
            }
        }
    }
}

fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("SHOP_BASE_URL".to_owned(), reason);
    let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("must be an http or https URL".to_owned()));
    }
    Ok(value.trim_end_matches('/').to_owned())
}

fn check_session_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!(
                "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }
    check_secret_strength(key, secret)
}

fn check_secret_strength(key: &str, secret: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!("looks like a placeholder (contains '{marker}')"),
        ));
    }

    let entropy = bits_per_char(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
            ),
        ));
    }
    Ok(())
}

/// Shannon entropy of the character distribution.
#[allow(clippy::cast_precision_loss)]
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    let total = counts.values().sum::<usize>() as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
