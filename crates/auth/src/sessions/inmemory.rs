//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_core::auth::{is_session_expired, Result, Session, SessionId, SessionRepository};

/// In-memory session store for development and testing.
///
/// Sessions live in a HashMap wrapped in `Arc<RwLock<_>>`. Data is not
/// persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>> {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id.as_str())
            .filter(|session| !is_session_expired(session, now))
            .cloned())
    }

    async fn put(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        // Opportunistic cleanup so abandoned sessions don't pile up.
        let now = Utc::now();
        sessions.retain(|_, s| !is_session_expired(s, now));
        sessions.insert(session.id.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gatehouse_core::auth::AccessToken;

    fn create_test_session(id: &str, ttl: Duration) -> Session {
        let now = Utc::now();
        Session::new(SessionId::new(id.to_string()), now, now + ttl)
    }

    fn sid(id: &str) -> SessionId {
        SessionId::new(id.to_string())
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemorySessionStore::new();
        let mut session = create_test_session("session-1", Duration::hours(1));
        session.pending_return_path = Some("/profile".to_string());

        store.put(&session).await.unwrap();

        let retrieved = store.get(&sid("session-1")).await.unwrap().unwrap();
        assert_eq!(retrieved, session);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = InMemorySessionStore::new();
        assert!(store.get(&sid("nonexistent")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = InMemorySessionStore::new();
        let mut session = create_test_session("session-1", Duration::hours(1));
        store.put(&session).await.unwrap();

        session.access_token = Some(AccessToken::new("T".to_string()));
        store.put(&session).await.unwrap();

        let retrieved = store.get(&sid("session-1")).await.unwrap().unwrap();
        assert!(retrieved.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_absent() {
        let store = InMemorySessionStore::new();
        let session = create_test_session("session-1", Duration::seconds(-1));
        store.put(&session).await.unwrap();

        assert!(store.get(&sid("session-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = InMemorySessionStore::new();
        store
            .put(&create_test_session("session-1", Duration::hours(1)))
            .await
            .unwrap();

        store.destroy(&sid("session-1")).await.unwrap();

        assert!(store.get(&sid("session-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy_nonexistent() {
        let store = InMemorySessionStore::new();
        // Should not error when deleting nonexistent session
        assert!(store.destroy(&sid("nonexistent")).await.is_ok());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = InMemorySessionStore::new();
        let clone = store.clone();

        store
            .put(&create_test_session("session-1", Duration::hours(1)))
            .await
            .unwrap();

        assert!(clone.get(&sid("session-1")).await.unwrap().is_some());
    }
}
