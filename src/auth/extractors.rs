use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};
use uuid::Uuid;

use super::session::SessionStore;
use crate::{respond::ApiError, state::AppState, users::repo_types::User};

/// Session identifier of the current request, set by [`session_middleware`].
///
/// A handler may swap in a new id with [`SessionId::renew`]; the middleware
/// then sends that one back instead.
#[derive(Debug, Clone)]
pub struct SessionId {
    current: String,
    renewed: Arc<Mutex<Option<String>>>,
}

impl SessionId {
    fn new(current: String) -> Self {
        Self {
            current,
            renewed: Arc::new(Mutex::new(None)),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    fn renew(&self) -> String {
        let id = new_session_id();
        *self.renewed.lock().unwrap_or_else(|e| e.into_inner()) = Some(id.clone());
        id
    }

    fn renewed(&self) -> Option<String> {
        self.renewed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Only ids the store knows are honoured. Anything else, including an id the
/// client made up, is replaced by a fresh one and the cookie is reset.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session_cookie.as_str();
    let presented = read_cookie(req.headers(), cookie_name);
    let known = match presented {
        Some(id) if state.sessions.get(&id).await.is_some() => Some(id),
        _ => None,
    };
    let fresh = known.is_none();
    let session = SessionId::new(known.unwrap_or_else(new_session_id));
    req.extensions_mut().insert(session.clone());

    let mut res = next.run(req).await;
    let issued = session
        .renewed()
        .or_else(|| fresh.then(|| session.current().to_string()));
    if let Some(id) = issued {
        let cookie = format!("{cookie_name}={id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(v) => {
                res.headers_mut().append(header::SET_COOKIE, v);
                debug!(session_id = %id, "session cookie issued");
            }
            Err(e) => error!(error = %e, "invalid session cookie"),
        }
    }
    res
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

/// Handle on the caller's session.
pub struct Session {
    id: SessionId,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub async fn user(&self) -> Option<User> {
        self.store.get(self.id.current()).await
    }

    /// Store `user` under a brand-new session id and drop the old one.
    pub async fn log_in(&self, user: User) {
        self.store.clear(self.id.current()).await;
        let id = self.id.renew();
        self.store.set(&id, user).await
    }

    pub async fn clear(&self) {
        self.store.clear(self.id.current()).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts.extensions.get::<SessionId>().cloned().ok_or_else(|| {
            error!("session middleware is not installed");
            ApiError::Internal
        })?;
        Ok(Session {
            id,
            store: state.sessions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for c in cookies {
            h.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        h
    }

    #[test]
    fn renew_replaces_the_issued_id() {
        let id = SessionId::new("old".into());
        assert_eq!(id.renewed(), None);
        let fresh = id.renew();
        assert_ne!(fresh, "old");
        assert_eq!(id.current(), "old");
        assert_eq!(id.clone().renewed(), Some(fresh));
    }

    #[test]
    fn reads_named_cookie() {
        let h = headers(&["theme=dark; sid=abc-123; lang=en"]);
        assert_eq!(read_cookie(&h, "sid").as_deref(), Some("abc-123"));
    }

    #[test]
    fn reads_cookie_from_second_header() {
        let h = headers(&["theme=dark", "sid=xyz"]);
        assert_eq!(read_cookie(&h, "sid").as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        assert_eq!(read_cookie(&headers(&[]), "sid"), None);
        assert_eq!(read_cookie(&headers(&["other=1"]), "sid"), None);
        assert_eq!(read_cookie(&headers(&["sid="]), "sid"), None);
        assert_eq!(read_cookie(&headers(&["sidx=1"]), "sid"), None);
    }
}
