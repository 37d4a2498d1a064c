//! Session context shared by every request.
//!
//! A session is created at login (OTP verification), attached to each request as bearer
//! token and username headers, and invalidated on logout or on any 401 response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::db::SessionRepository;
use crate::errors::ClientError;

/// Header carrying the acting username next to the bearer token.
pub const USERNAME_HEADER: &str = "x-username";

/// An authenticated backend session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user_id: String,
    pub username: String,
    pub established_at: DateTime<Utc>,
}

impl Session {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Holder of the current session, optionally mirrored to a persistent store.
#[derive(Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    store: Option<SessionRepository>,
}

impl SessionContext {
    /// Context without persistence; sessions live only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Context backed by a store, loading whatever session it already holds.
    pub async fn restore(store: SessionRepository) -> Result<Self, ClientError> {
        let saved = store.load().await?;
        if let Some(session) = &saved {
            tracing::info!("Restored session for {}", session.username);
        }

        Ok(Self {
            current: Arc::new(RwLock::new(saved)),
            store: Some(store),
        })
    }

    /// Snapshot of the current session.
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Current session, or `MissingAuth` when nobody is logged in.
    pub async fn require(&self) -> Result<Session, ClientError> {
        self.current().await.ok_or(ClientError::MissingAuth)
    }

    pub async fn is_active(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Install a freshly created session.
    pub async fn establish(&self, session: Session) -> Result<(), ClientError> {
        if let Some(store) = &self.store {
            store.save(&session).await?;
        }
        tracing::info!("Session established for {}", session.username);
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Drop the session from memory and from the store.
    ///
    /// Store failures are logged; the in-memory session is cleared regardless.
    pub async fn invalidate(&self) {
        let previous = self.current.write().await.take();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear().await {
                tracing::warn!("Failed to clear persisted session: {}", e);
            }
        }
        if let Some(session) = previous {
            tracing::info!("Session invalidated for {}", session.username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            refresh: None,
            user_id: "ADM001".to_string(),
            username: "registrar".to_string(),
            established_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_header_value() {
        assert_eq!(session("abc").bearer(), "Bearer abc");
    }

    #[tokio::test]
    async fn test_require_without_session() {
        let context = SessionContext::in_memory();
        let err = context.require().await.unwrap_err();
        assert!(err.requires_login());
    }

    #[tokio::test]
    async fn test_establish_and_invalidate() {
        let context = SessionContext::in_memory();
        context.establish(session("abc")).await.unwrap();
        assert!(context.is_active().await);
        assert_eq!(context.require().await.unwrap().token, "abc");

        let clone = context.clone();
        clone.invalidate().await;
        assert!(!context.is_active().await);
    }
}
