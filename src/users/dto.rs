use serde::Deserialize;

/// Body of `POST /users` and `POST /sign-up`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    /// Plaintext; hashed before it reaches the repo. Omitted means the user has
    /// no credentials and can't log in.
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `PUT /users/:id`. Only these two columns are updatable.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub name: String,
}

/// What the repo inserts. `password` is already an argon2 hash.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
}
