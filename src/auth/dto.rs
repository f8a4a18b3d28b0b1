use serde::Deserialize;

/// Request body for `POST /auth/log-in`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
