use sqlx::FromRow;
use time::OffsetDateTime;

/// Raw `users` row as the driver returns it.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub super_admin: i64,
    pub password: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User record used by the rest of the app. Still carries the password hash;
/// it is dropped when the user is turned into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub super_admin: bool,
    pub password: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            name: r.name,
            super_admin: r.super_admin != 0,
            password: r.password,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(super_admin: i64) -> UserRow {
        let now = OffsetDateTime::now_utc();
        UserRow {
            id: 7,
            email: "a@x.com".into(),
            name: "A".into(),
            super_admin,
            password: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn super_admin_is_normalized_to_bool() {
        assert!(!User::from(row(0)).super_admin);
        assert!(User::from(row(1)).super_admin);
        assert!(User::from(row(42)).super_admin);
    }
}
