use crate::auth::session::{MemorySessionStore, SessionStore};
use crate::config::AppConfig;
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await?;
        let sessions = Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>;
        Ok(Self::from_parts(db, config, sessions))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            db,
            config,
            sessions,
        }
    }

    /// Fresh in-memory database and session store.
    #[cfg(test)]
    pub async fn fake() -> Self {
        let db = db::in_memory().await;
        let config = Arc::new(AppConfig::default());
        let sessions = Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>;
        Self::from_parts(db, config, sessions)
    }
}
