//! Social sign-in client (Google, Facebook).
//!
//! # OAuth Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the user to the provider's consent page
//! 3. The provider redirects back to `/auth/{provider}/callback` with a code
//! 4. `sign_in()` exchanges the code for an access token and fetches the
//!    profile, returning a [`ProviderIdentity`]

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use simple_shop_core::Email;

use crate::config::{ProviderCredentials, ShopConfig};
use crate::models::{OAuthProvider, ProviderIdentity};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/v19.0/me";

/// Errors from the sign-in providers.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Provider has no credentials configured.
    #[error("sign-in provider {0} is not enabled")]
    Disabled(OAuthProvider),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request or returned something unusable.
    #[error("provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookProfile {
    id: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: String,
}

impl From<GoogleUserInfo> for ProviderIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        // Unverified Google addresses must not link to existing users.
        let email = info
            .email
            .filter(|_| info.email_verified)
            .and_then(|e| Email::parse(&e).ok());

        Self {
            provider: OAuthProvider::Google,
            provider_account_id: info.sub,
            email,
            name: info.name,
            image: info.picture,
        }
    }
}

impl From<FacebookProfile> for ProviderIdentity {
    fn from(profile: FacebookProfile) -> Self {
        Self {
            provider: OAuthProvider::Facebook,
            provider_account_id: profile.id,
            email: profile.email.and_then(|e| Email::parse(&e).ok()),
            name: profile.name,
            image: profile.picture.map(|p| p.data.url),
        }
    }
}

/// Client for the configured sign-in providers.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    base_url: String,
    google: Option<ProviderCredentials>,
    facebook: Option<ProviderCredentials>,
}

impl OAuthClient {
    /// Create a client for the providers enabled in `config`.
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                google: config.oauth.google.clone(),
                facebook: config.oauth.facebook.clone(),
            }),
        }
    }

    /// Providers with credentials configured.
    #[must_use]
    pub fn enabled(&self) -> Vec<OAuthProvider> {
        OAuthProvider::ALL
            .into_iter()
            .filter(|p| self.credentials(*p).is_ok())
            .collect()
    }

    fn credentials(&self, provider: OAuthProvider) -> Result<&ProviderCredentials, OAuthError> {
        match provider {
            OAuthProvider::Google => self.inner.google.as_ref(),
            OAuthProvider::Facebook => self.inner.facebook.as_ref(),
        }
        .ok_or(OAuthError::Disabled(provider))
    }

    /// Callback URL registered with the provider.
    #[must_use]
    pub fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!("{}/auth/{}/callback", self.inner.base_url, provider.slug())
    }

    /// URL of the provider's consent page.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Disabled` if the provider is not configured.
    pub fn authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
    ) -> Result<String, OAuthError> {
        let creds = self.credentials(provider)?;
        let (base, scope) = match provider {
            OAuthProvider::Google => (GOOGLE_AUTHORIZE_URL, "openid email profile"),
            OAuthProvider::Facebook => (FACEBOOK_AUTHORIZE_URL, "email,public_profile"),
        };

        Ok(format!(
            "{base}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&creds.client_id),
            urlencoding::encode(&self.redirect_uri(provider)),
            urlencoding::encode(scope),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code and fetch the user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is disabled, the exchange fails, or
    /// the profile cannot be fetched.
    pub async fn sign_in(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<ProviderIdentity, OAuthError> {
        let access_token = self.exchange_code(provider, code).await?;
        self.fetch_identity(provider, &access_token).await
    }

    async fn exchange_code(&self, provider: OAuthProvider, code: &str) -> Result<String, OAuthError> {
        let creds = self.credentials(provider)?;
        let redirect_uri = self.redirect_uri(provider);
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ];

        let request = match provider {
            OAuthProvider::Google => self.inner.client.post(GOOGLE_TOKEN_URL).form(&params),
            OAuthProvider::Facebook => self.inner.client.get(FACEBOOK_TOKEN_URL).query(&params),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider(format!(
                "{provider} token exchange failed ({status}): {text}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<ProviderIdentity, OAuthError> {
        let request = match provider {
            OAuthProvider::Google => self
                .inner
                .client
                .get(GOOGLE_USERINFO_URL)
                .bearer_auth(access_token),
            OAuthProvider::Facebook => self.inner.client.get(FACEBOOK_PROFILE_URL).query(&[
                ("fields", "id,name,email,picture.type(large)"),
                ("access_token", access_token),
            ]),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(OAuthError::Provider(format!(
                "{provider} profile request failed ({})",
                response.status()
            )));
        }

        let identity = match provider {
            OAuthProvider::Google => response.json::<GoogleUserInfo>().await?.into(),
            OAuthProvider::Facebook => response.json::<FacebookProfile>().await?.into(),
        };
        Ok(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::OAuthConfig;

    fn client(google: bool) -> OAuthClient {
        let creds = ProviderCredentials {
            client_id: "client id".to_owned(),
            client_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%vD8"),
        };
        let config = ShopConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.test".to_owned(),
            session_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%vD8"),
            oauth: OAuthConfig {
                google: google.then(|| creds.clone()),
                facebook: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        OAuthClient::new(&config)
    }

    #[test]
    fn test_enabled_providers() {
        assert_eq!(client(true).enabled(), vec![OAuthProvider::Google]);
        assert!(client(false).enabled().is_empty());
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let url = client(true)
            .authorization_url(OAuthProvider::Google, "st/ate")
            .unwrap();
        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fshop.test%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("state=st%2Fate"));
    }

    #[test]
    fn test_disabled_provider_is_rejected() {
        let err = client(true)
            .authorization_url(OAuthProvider::Facebook, "state")
            .unwrap_err();
        assert!(matches!(err, OAuthError::Disabled(OAuthProvider::Facebook)));
    }

    #[test]
    fn test_unverified_google_email_is_dropped() {
        let info: GoogleUserInfo = serde_json::from_value(serde_json::json!({
            "sub": "1234",
            "email": "Jane@Example.com",
            "email_verified": false,
            "name": "Jane"
        }))
        .unwrap();
        let identity = ProviderIdentity::from(info);
        assert_eq!(identity.provider_account_id, "1234");
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_facebook_profile_picture() {
        let profile: FacebookProfile = serde_json::from_value(serde_json::json!({
            "id": "987",
            "name": "Juan",
            "email": "juan@example.com",
            "picture": { "data": { "url": "https://graph.example/p.jpg" } }
        }))
        .unwrap();
        let identity = ProviderIdentity::from(profile);
        assert_eq!(identity.email.unwrap().as_str(), "juan@example.com");
        assert_eq!(identity.image.as_deref(), Some("https://graph.example/p.jpg"));
    }
}
