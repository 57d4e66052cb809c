//! SQLite session storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use gatehouse_core::auth::{AccessToken, AuthError, Result, Session, SessionId, SessionRepository};
use sqlx::SqlitePool;

type SessionRow = (String, Option<String>, Option<String>, String, String);

/// SQLite-backed session storage.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Creates a new SQLite session store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                access_token TEXT,
                pending_return_path TEXT,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// Fixed-width UTC timestamps so `expires_at` compares correctly as text.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| AuthError::Storage(e.to_string()))?
        .with_timezone(&Utc))
}

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, access_token, pending_return_path, created_at, expires_at FROM sessions WHERE id = ? AND expires_at > ?",
        )
        .bind(id.as_str())
        .bind(format_timestamp(Utc::now()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        match row {
            Some((id, access_token, pending_return_path, created_at, expires_at)) => {
                Ok(Some(Session {
                    id: SessionId::new(id),
                    access_token: access_token.map(AccessToken::new),
                    pending_return_path,
                    created_at: parse_timestamp(&created_at)?,
                    expires_at: parse_timestamp(&expires_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sessions (id, access_token, pending_return_path, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.as_str())
        .bind(session.access_token.as_ref().map(|t| t.secret().to_string()))
        .bind(&session.pending_return_path)
        .bind(format_timestamp(session.created_at))
        .bind(format_timestamp(session.expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> SqliteSessionStore {
        // One connection: every in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteSessionStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    fn session(id: &str, ttl: Duration) -> Session {
        let now = Utc::now();
        Session::new(SessionId::new(id.to_string()), now, now + ttl)
    }

    #[tokio::test]
    async fn test_put_get_destroy() {
        let store = store().await;
        let mut s = session("session-1", Duration::hours(1));
        s.access_token = Some(AccessToken::new("T".to_string()));
        s.pending_return_path = Some("/profile".to_string());

        store.put(&s).await.unwrap();
        let retrieved = store.get(&s.id).await.unwrap().unwrap();
        assert_eq!(retrieved.access_token, s.access_token);
        assert_eq!(retrieved.pending_return_path, s.pending_return_path);

        store.destroy(&s.id).await.unwrap();
        assert!(store.get(&s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_absent() {
        let store = store().await;
        let s = session("session-1", Duration::seconds(-5));
        store.put(&s).await.unwrap();

        assert!(store.get(&s.id).await.unwrap().is_none());
    }
}
