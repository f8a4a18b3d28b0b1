//! Wire format for users and errors.
//!
//! Every user leaving the service goes through [`PublicUser`], which has no
//! password field. Every failure goes through [`ApiError`].

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::users::{repo::RepoError, repo_types::User};

/// User as returned to clients.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub super_admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            super_admin: u.super_admin,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

pub fn user(user: User) -> Json<PublicUser> {
    Json(user.into())
}

pub fn users(users: Vec<User>) -> Json<Vec<PublicUser>> {
    Json(users.into_iter().map(PublicUser::from).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Not currently logged-in.")]
    NotLoggedIn,
    #[error("User not found with that ID.")]
    UserNotFoundById,
    #[error("User not found with that email.")]
    UserNotFoundByEmail,
    #[error("Sorry, that password does not match.")]
    PasswordMismatch,
    #[error("User with that email address already exists.")]
    EmailInUse,
    #[error("Sorry, an internal server error occurred.")]
    Internal,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::NotLoggedIn | ApiError::UserNotFoundById | ApiError::UserNotFoundByEmail => {
                StatusCode::NOT_FOUND
            }
            ApiError::PasswordMismatch => StatusCode::UNAUTHORIZED,
            ApiError::EmailInUse => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    message: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: true,
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::EmailInUse => ApiError::EmailInUse,
            RepoError::Database(e) => {
                error!(error = %e, "database error");
                ApiError::Internal
            }
        }
    }
}

/// JSON body extractor whose failures use the same error envelope as
/// everything else. A body that doesn't deserialize is answered with 500.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "rejected json body");
                Err(ApiError::Internal)
            }
        }
    }
}

/// Log an unexpected failure and collapse it to a bare 500.
pub fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    error!(error = %e, "internal error");
    ApiError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 1,
            email: "a@x.com".into(),
            name: "A".into(),
            super_admin: false,
            password: Some("$argon2id$secret".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_has_no_password() {
        let value = serde_json::to_value(PublicUser::from(sample_user())).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["createdAt", "email", "id", "name", "superAdmin", "updatedAt"]
        );
        assert_eq!(obj["superAdmin"], json!(false));
    }

    #[test]
    fn users_redacts_every_element() {
        let Json(list) = users(vec![sample_user(), sample_user()]);
        let value = serde_json::to_value(list).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert!(arr.iter().all(|u| u.get("password").is_none()));
    }

    #[test]
    fn error_catalog_statuses() {
        assert_eq!(ApiError::NotLoggedIn.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UserNotFoundById.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UserNotFoundByEmail.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PasswordMismatch.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::EmailInUse.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn error_response_envelope() {
        let res = ApiError::EmailInUse.into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "error": true,
                "message": "User with that email address already exists.",
                "status": 409,
            })
        );
    }

    #[test]
    fn repo_errors_map_to_catalog() {
        assert_eq!(ApiError::from(RepoError::EmailInUse), ApiError::EmailInUse);
        assert_eq!(
            ApiError::from(RepoError::Database(sqlx::Error::PoolClosed)),
            ApiError::Internal
        );
    }
}
