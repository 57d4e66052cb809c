//! Redis session storage implementation.

use async_trait::async_trait;
use chrono::Utc;
use fred::prelude::*;
use gatehouse_core::auth::{AuthError, Result, Session, SessionId, SessionRepository};

/// Redis-backed session storage.
///
/// Each session is a JSON string whose key TTL tracks the session's own
/// `expires_at`, so rewriting a session never extends it.
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    /// Creates a new Redis session store.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    fn session_key(id: &SessionId) -> String {
        format!("session:{}", id)
    }
}

#[async_trait]
impl SessionRepository for RedisSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>> {
        let key = Self::session_key(id);
        let value: Option<String> = self
            .pool
            .get(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let session: Session =
                    serde_json::from_str(&json).map_err(|e| AuthError::Storage(e.to_string()))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, session: &Session) -> Result<()> {
        let ttl_secs = (session.expires_at - Utc::now()).num_seconds();
        if ttl_secs <= 0 {
            return self.destroy(&session.id).await;
        }

        let key = Self::session_key(&session.id);
        let value =
            serde_json::to_string(session).map_err(|e| AuthError::Storage(e.to_string()))?;

        self.pool
            .set::<(), _, _>(&key, &value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let key = Self::session_key(id);
        self.pool
            .del::<(), _>(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}
