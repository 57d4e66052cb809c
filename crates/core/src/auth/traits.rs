use async_trait::async_trait;

use super::{AuthError, ExchangeFailure, Session, SessionId, TokenGrant};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Outcome of a single authorization-code exchange.
pub type ExchangeResult = std::result::Result<TokenGrant, ExchangeFailure>;

/// Session storage abstraction.
///
/// Implementations own expiry: a record past its `expires_at` reads as absent.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Retrieve a live session by ID.
    async fn get(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Insert or replace a session, keeping its existing expiry.
    async fn put(&self, session: &Session) -> Result<()>;

    /// Delete a session. Deleting a missing session is not an error.
    async fn destroy(&self, id: &SessionId) -> Result<()>;
}

/// Exchanges an authorization code for an access token.
#[async_trait]
pub trait TokenExchangeClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> ExchangeResult;
}
