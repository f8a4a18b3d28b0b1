use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::password::hash_password,
    respond::{self, internal, ApiError, ApiJson, PublicUser},
    state::AppState,
    users::{
        dto::{CreateUserRequest, NewUser, UpdateUserRequest},
        repo,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub fn sign_up_routes() -> Router<AppState> {
    Router::new().route("/sign-up", post(sign_up))
}

/// Ids that aren't integers can't name a row.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::UserNotFoundById)
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = repo::list(&state.db).await?;
    Ok(respond::users(users))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let password = match payload.password.as_deref() {
        Some(plain) => Some(hash_password(plain).map_err(internal)?),
        None => None,
    };
    let new = NewUser {
        email: payload.email,
        name: payload.name,
        password,
    };
    let user = repo::create(&state.db, &new).await?;
    info!(user_id = user.id, "user created");
    Ok(respond::user(user))
}

/// Same as [`create_user`]; the place for anything that should only happen
/// on self-service registration.
#[instrument(skip(state, payload))]
pub async fn sign_up(
    state: State<AppState>,
    payload: ApiJson<CreateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    create_user(state, payload).await
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_id(&id)?;
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::UserNotFoundById)?;
    Ok(respond::user(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_id(&id)?;
    let user = repo::update(&state.db, id, &payload)
        .await?
        .ok_or(ApiError::UserNotFoundById)?;
    info!(user_id = user.id, "user updated");
    Ok(respond::user(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_id(&id)?;
    let user = repo::delete(&state.db, id)
        .await?
        .ok_or(ApiError::UserNotFoundById)?;
    info!(user_id = user.id, "user deleted");
    Ok(respond::user(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("12"), Ok(12));
        assert_eq!(parse_id("abc"), Err(ApiError::UserNotFoundById));
        assert_eq!(parse_id(""), Err(ApiError::UserNotFoundById));
    }
}
