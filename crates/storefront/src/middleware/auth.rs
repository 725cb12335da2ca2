//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user (or admin) in route
//! handlers. The current user lives in the session, put there at login.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in admin.
///
/// Rejects anonymous requests with 401 and non-admin users with 403.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a request lacks the required authentication.
pub enum AuthRejection {
    /// No logged-in user in the session.
    Unauthenticated,
    /// Logged in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Read the current user out of the session, if any.
async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or(AuthRejection::Unauthenticated)?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or(AuthRejection::Unauthenticated)?;

        if !user.is_admin() {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Helper to set the current user in the session (login).
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

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn anonymous_parts() -> Parts {
        Request::builder()
            .uri("/cart")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_require_auth_rejects_without_session() {
        let mut parts = anonymous_parts();

        let err = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthRejection::Unauthenticated));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_without_session() {
        let mut parts = anonymous_parts();

        let err = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthRejection::Unauthenticated));
    }

    #[tokio::test]
    async fn test_optional_auth_defaults_to_anonymous() {
        let mut parts = anonymous_parts();

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
