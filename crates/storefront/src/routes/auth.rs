//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn session_user(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.profile.role,
    }
}

/// POST /auth/register - create an account and log it in.
#[instrument(skip_all, fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool());
    let user = service.register(&request.email, &request.password).await?;

    set_current_user(&session, &session_user(&user)).await?;

    tracing::info!(user_id = %user.id, "registered new user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login - authenticate and store the user in the session.
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>> {
    let service = AuthService::new(state.pool());
    let user = service.login(&request.email, &request.password).await?;

    // Rotate the session ID so the pre-login session can't be replayed.
    session.cycle_id().await?;
    set_current_user(&session, &session_user(&user)).await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user))
}

/// POST /auth/logout - drop the user from the session.
///
/// The cart lives in the same session and survives logout.
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

/// GET /account - the logged-in user's account.
pub async fn account(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(Json(user))
}
