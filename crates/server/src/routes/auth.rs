//! Sign-in route handlers.
//!
//! Google and Facebook use the authorization-code flow with a random `state`
//! kept in the session. Guests sign in without a database row.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::{CurrentUser, OAuthProvider, session_keys};
use crate::state::AppState;

/// Length of the OAuth `state` parameter.
const STATE_LENGTH: usize = 32;

fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SignInTemplate {
    pub user: Option<CurrentUser>,
    pub providers: Vec<OAuthProvider>,
    pub error: Option<&'static str>,
}

/// Query parameters for the sign-in page.
#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub error: Option<String>,
}

fn error_message(code: &str) -> &'static str {
    match code {
        "denied" => "Sign-in was cancelled.",
        "invalid_state" => "Your sign-in session expired. Please try again.",
        "provider" => "The sign-in provider could not be reached. Please try again.",
        _ => "Sign-in failed. Please try again.",
    }
}

/// Display the sign-in page.
pub async fn signin_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<SignInQuery>,
) -> SignInTemplate {
    SignInTemplate {
        user,
        providers: state.oauth().enabled(),
        error: query.error.as_deref().map(error_message),
    }
}

/// Redirect to the provider's consent page.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
) -> Response {
    let Ok(provider) = provider.parse::<OAuthProvider>() else {
        return super::not_found_page(None);
    };

    let csrf_state = generate_state();
    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &csrf_state).await {
        tracing::error!("Failed to store OAuth state: {e}");
        return Redirect::to("/auth/signin?error=session").into_response();
    }

    match state.oauth().authorization_url(provider, &csrf_state) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::warn!("Sign-in with disabled provider: {e}");
            super::not_found_page(None)
        }
    }
}

/// OAuth callback query parameters.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Handle the provider redirect: verify state, sign in, store the user.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Ok(provider) = provider.parse::<OAuthProvider>() else {
        return super::not_found_page(None);
    };

    if let Some(error) = query.error {
        tracing::warn!(%provider, "OAuth error: {error}");
        return Redirect::to("/auth/signin?error=denied").into_response();
    }

    // One-time use: removed whether or not it matches.
    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!(%provider, "OAuth callback missing code or state");
        return Redirect::to("/auth/signin?error=invalid_state").into_response();
    };

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!(%provider, "OAuth state mismatch");
        return Redirect::to("/auth/signin?error=invalid_state").into_response();
    }

    let identity = match state.oauth().sign_in(provider, &code).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(%provider, "OAuth sign-in failed: {e}");
            return Redirect::to("/auth/signin?error=provider").into_response();
        }
    };

    let user = match UserRepository::new(state.pool())
        .upsert_from_identity(&identity)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(%provider, "Failed to store signed-in user: {e}");
            return Redirect::to("/auth/signin?error=storage").into_response();
        }
    };

    let current = CurrentUser::from(&user);
    if let Err(e) = start_session(&session, &current).await {
        tracing::error!("Failed to store user in session: {e}");
        return Redirect::to("/auth/signin?error=session").into_response();
    }

    set_sentry_user(current.id.as_ref(), current.email.as_ref().map(|e| e.as_str()));
    tracing::info!(user_id = %user.id, %provider, "User signed in");

    let destination = if current.is_admin() { "/admin" } else { "/" };
    Redirect::to(destination).into_response()
}

/// Sign in as a guest.
pub async fn guest(session: Session) -> Response {
    let current = CurrentUser::guest();
    if let Err(e) = start_session(&session, &current).await {
        tracing::error!("Failed to store guest in session: {e}");
        return Redirect::to("/auth/signin?error=session").into_response();
    }

    tracing::info!("Guest signed in");
    Redirect::to("/").into_response()
}

/// Sign out and return to the home page.
pub async fn signout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/")
}

/// Rotate the session id and store the signed-in user.
async fn start_session(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    set_current_user(session, user).await
}
