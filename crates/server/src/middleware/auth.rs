//! Authentication middleware and extractors.
//!
//! The back-office and the write half of the JSON API require an admin. The
//! role stored in the session is refreshed from the database on every check
//! so a demotion takes effect on the next request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in admin.
///
/// HTML requests without a user are redirected to the sign-in page; API
/// requests get 401. Signed-in users without the admin role get 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Why an admin check failed.
#[derive(Debug)]
pub enum AdminRejection {
    /// Redirect to the sign-in page (HTML requests).
    RedirectToSignIn,
    /// No signed-in user (API requests).
    Unauthorized,
    /// Signed in without the admin role.
    Forbidden { api: bool },
    /// The role could not be refreshed.
    Internal,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn => Redirect::to("/auth/signin").into_response(),
            Self::Unauthorized => AppError::Unauthorized.into_response(),
            Self::Forbidden { api: true } => AppError::Forbidden.into_response(),
            Self::Forbidden { api: false } => (
                StatusCode::FORBIDDEN,
                "You do not have access to this page.",
            )
                .into_response(),
            Self::Internal => {
                AppError::Internal("failed to refresh user role".to_owned()).into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api = parts.uri.path().starts_with("/api/");
        let session = parts.extensions.get::<Session>().cloned();
        authorize_admin(session.as_ref(), state, api).await.map(Self)
    }
}

/// Extractor that optionally gets the current user.
///
/// Never rejects; pages use it to render the header.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Route layer guarding mutating methods behind the admin role.
///
/// Safe methods pass through, so catalog reads stay public.
pub async fn require_admin_for_writes(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) {
        return next.run(request).await;
    }

    let session = request.extensions().get::<Session>().cloned();
    match authorize_admin(session.as_ref(), &state, true).await {
        Ok(_) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}

async fn session_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Resolve the session user and require the admin role.
async fn authorize_admin(
    session: Option<&Session>,
    state: &AppState,
    api: bool,
) -> Result<CurrentUser, AdminRejection> {
    let unauthenticated = || {
        if api {
            AdminRejection::Unauthorized
        } else {
            AdminRejection::RedirectToSignIn
        }
    };

    let session = session.ok_or_else(unauthenticated)?;
    let user = session_user(session).await.ok_or_else(unauthenticated)?;

    // Guests have no row to refresh and are never admins.
    let Some(id) = user.id else {
        return Err(AdminRejection::Forbidden { api });
    };

    let stored = UserRepository::new(state.pool())
        .get_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to refresh user role");
            AdminRejection::Internal
        })?
        .ok_or_else(unauthenticated)?;

    let current = CurrentUser::from(&stored);
    if current.role != user.role
        && let Err(e) = set_current_user(session, &current).await
    {
        tracing::warn!(error = %e, user_id = %id, "Failed to store refreshed role");
    }

    if current.is_admin() {
        Ok(current)
    } else {
        Err(AdminRejection::Forbidden { api })
    }
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Sign out: drop everything in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
