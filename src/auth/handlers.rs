use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::LoginRequest, extractors::Session, password::verify_password},
    respond::{self, internal, ApiError, ApiJson, PublicUser},
    state::AppState,
    users::repo,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/log-in", post(log_in))
        .route("/auth/log-out", post(log_out))
}

/// The user stored in the session at log-in time.
#[instrument(skip(session))]
pub async fn me(session: Session) -> Result<Json<PublicUser>, ApiError> {
    let user = session.user().await.ok_or(ApiError::NotLoggedIn)?;
    Ok(respond::user(user))
}

#[instrument(skip(state, session, payload))]
pub async fn log_in(
    State(state): State<AppState>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::UserNotFoundByEmail)?;

    // Users created without credentials can never log in.
    let Some(hash) = user.password.as_deref() else {
        warn!(user_id = user.id, "login for user without password");
        return Err(ApiError::PasswordMismatch);
    };
    if !verify_password(&payload.password, hash).map_err(internal)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::PasswordMismatch);
    }

    session.log_in(user.clone()).await;
    info!(user_id = user.id, "user logged in");
    Ok(respond::user(user))
}

/// Always succeeds, whether or not anyone was logged in.
#[instrument(skip(session))]
pub async fn log_out(session: Session) -> StatusCode {
    session.clear().await;
    StatusCode::OK
}
