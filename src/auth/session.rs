use std::collections::HashMap;

use axum::async_trait;
use tokio::sync::RwLock;

use crate::users::repo_types::User;

/// Server-side session state: at most one logged-in user per session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<User>;
    async fn set(&self, id: &str, user: User);
    async fn clear(&self, id: &str);
}

/// Process-local store. Sessions are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, User>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Option<User> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn set(&self, id: &str, user: User) {
        self.sessions.write().await.insert(id.to_string(), user);
    }

    async fn clear(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user(id: i64) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id,
            email: format!("u{id}@x.com"),
            name: "U".into(),
            super_admin: false,
            password: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn set_get_clear() {
        let store = MemorySessionStore::new();
        assert!(store.get("s1").await.is_none());

        store.set("s1", user(1)).await;
        assert_eq!(store.get("s1").await.map(|u| u.id), Some(1));
        assert!(store.get("s2").await.is_none());

        store.set("s1", user(2)).await;
        assert_eq!(store.get("s1").await.map(|u| u.id), Some(2));

        store.clear("s1").await;
        assert!(store.get("s1").await.is_none());
    }

    #[tokio::test]
    async fn clear_unknown_session_is_noop() {
        let store = MemorySessionStore::new();
        store.clear("nope").await;
        assert!(store.get("nope").await.is_none());
    }
}
