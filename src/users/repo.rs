use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::users::{
    dto::{NewUser, UpdateUserRequest},
    repo_types::{User, UserRow},
};

const USER_COLUMNS: &str = "id, email, name, super_admin, password, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already in use")]
    EmailInUse,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

fn map_write_error(err: sqlx::Error) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::EmailInUse
    } else {
        RepoError::Database(err)
    }
}

/// `email` is the only unique column besides the primary key.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

pub async fn list(db: &SqlitePool) -> Result<Vec<User>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(User::from).collect())
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(User::from))
}

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row.map(User::from))
}

/// Insert a user. `super_admin` always starts out false.
pub async fn create(db: &SqlitePool, new: &NewUser) -> Result<User, RepoError> {
    let now = OffsetDateTime::now_utc();
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (email, name, password, super_admin, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&new.email)
    .bind(&new.name)
    .bind(&new.password)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
    .map_err(map_write_error)?;
    Ok(row.into())
}

/// Returns `None` when no user has this id.
pub async fn update(
    db: &SqlitePool,
    id: i64,
    dto: &UpdateUserRequest,
) -> Result<Option<User>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET email = ?, name = ?, updated_at = ?
        WHERE id = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&dto.email)
    .bind(&dto.name)
    .bind(OffsetDateTime::now_utc())
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(map_write_error)?;
    Ok(row.map(User::from))
}

/// Returns the row as it was before deletion, or `None` when no user has
/// this id.
pub async fn delete(db: &SqlitePool, id: i64) -> Result<Option<User>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "DELETE FROM users WHERE id = ? RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(User::from))
}
