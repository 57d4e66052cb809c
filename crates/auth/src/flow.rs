//! The redirect flow engine.
//!
//! State machine over one session:
//!
//! - `ANONYMOUS --login--> AWAITING_CALLBACK`: the browser is sent to the
//!   provider; no session write.
//! - `AWAITING_CALLBACK --callback--> EXCHANGING`: the code is exchanged.
//! - `EXCHANGING --ok--> AUTHENTICATED`: token stored under a fresh session
//!   id, pending return path consumed, browser resumed there.
//! - `EXCHANGING --err--> ANONYMOUS`: session untouched.
//! - `AUTHENTICATED --logout--> LOGGED_OUT`: session destroyed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gatehouse_core::auth::{
    calculate_expiry, complete_sign_in, generate_session_id, AccessToken, AuthorizationEndpoint,
    ExchangeFailure, LogoutOutcome, ReturnPath, Session, SessionId, SessionRepository,
    TokenExchangeClient,
};
use url::Url;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::locks::SessionLocks;

/// A completed sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// Id the authenticated session now lives under. Never the id the
    /// callback arrived with.
    pub session_id: SessionId,
    /// Where to resume.
    pub destination: String,
}

/// Drives login, callback and logout against injected collaborators.
#[derive(Clone)]
pub struct FlowEngine {
    sessions: Arc<dyn SessionRepository>,
    exchange: Arc<dyn TokenExchangeClient>,
    locks: Arc<SessionLocks>,
    login_url: Url,
    session_ttl: chrono::Duration,
    exchange_timeout: Duration,
}

impl FlowEngine {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        exchange: Arc<dyn TokenExchangeClient>,
        config: &AuthConfig,
    ) -> Self {
        let provider = &config.provider;
        let login_url = AuthorizationEndpoint::new(
            provider.authorize_url.clone(),
            provider.client_id.clone(),
        )
        .login_url(&provider.redirect_uri, &provider.scopes);

        Self {
            sessions,
            exchange,
            locks: Arc::new(SessionLocks::new()),
            login_url,
            // `AuthConfig` bounds the TTL; anything larger saturates.
            session_ttl: chrono::Duration::from_std(config.session_ttl)
                .unwrap_or(chrono::Duration::MAX),
            exchange_timeout: config.exchange_timeout,
        }
    }

    /// Identity-provider URL for the login leg. Built once at startup.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// The live session record for `id`, if the store has one.
    pub async fn session(&self, id: &SessionId) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.get(id).await?)
    }

    /// The token bound to the session, if it is authenticated.
    pub async fn access_token(&self, id: &SessionId) -> Result<Option<AccessToken>, AuthError> {
        Ok(self
            .session(id)
            .await?
            .and_then(|session| session.access_token))
    }

    /// Records where to resume after sign-in.
    ///
    /// Taking a [`ReturnPath`] means the value was validated before it got
    /// anywhere near the store.
    pub async fn capture_return_path(
        &self,
        id: &SessionId,
        path: ReturnPath,
    ) -> Result<(), AuthError> {
        let _guard = self.locks.acquire(id).await;

        let mut session = match self.sessions.get(id).await? {
            Some(session) => session,
            None => self.fresh_session(id.clone()),
        };
        session.pending_return_path = Some(path.into_inner());
        self.sessions.put(&session).await?;

        Ok(())
    }

    /// Exchanges `code` and binds the token to the session.
    ///
    /// The authenticated record moves to a newly generated id and the record
    /// under `id` is destroyed, so an id known before sign-in never carries
    /// the token. The destination is the pending return path, or `/` when
    /// there is none. On failure the session is left exactly as it was,
    /// including any pending return path.
    pub async fn complete_callback(
        &self,
        id: &SessionId,
        code: &str,
    ) -> Result<SignedIn, AuthError> {
        let grant = match tokio::time::timeout(
            self.exchange_timeout,
            self.exchange.exchange_code(code),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ExchangeFailure::TimedOut(self.exchange_timeout.as_secs())),
        };

        let grant = match grant {
            Ok(grant) => grant,
            Err(failure) => {
                tracing::warn!(session_id = %id, error = %failure, "Token exchange failed");
                return Err(failure.into());
            }
        };

        let _guard = self.locks.acquire(id).await;

        let existing = self.sessions.get(id).await?;
        let had_record = existing.is_some();
        let mut session = existing.unwrap_or_else(|| self.fresh_session(id.clone()));

        let destination = complete_sign_in(&mut session, grant.access_token);
        session.id = generate_session_id();
        self.sessions.put(&session).await?;
        if had_record {
            self.sessions.destroy(id).await?;
        }

        tracing::info!(
            account = grant.account.as_deref().unwrap_or("unknown account"),
            "Sign in successful"
        );

        Ok(SignedIn {
            session_id: session.id,
            destination,
        })
    }

    /// Destroys the session if it holds a token.
    ///
    /// A session without a token is reported as `NotLoggedIn` and left alone.
    pub async fn logout(&self, id: &SessionId) -> Result<LogoutOutcome, AuthError> {
        let _guard = self.locks.acquire(id).await;

        let authenticated = self
            .sessions
            .get(id)
            .await?
            .is_some_and(|session| session.is_authenticated());

        if !authenticated {
            tracing::debug!(session_id = %id, "Logout without a signed-in session");
            return Ok(LogoutOutcome::NotLoggedIn);
        }

        self.sessions
            .destroy(id)
            .await
            .map_err(|e| AuthError::Logout(e.to_string()))?;
        tracing::info!(session_id = %id, "Session destroyed on logout");

        Ok(LogoutOutcome::LoggedOut)
    }

    fn fresh_session(&self, id: SessionId) -> Session {
        let now = Utc::now();
        Session::new(id, now, calculate_expiry(now, self.session_ttl))
    }
}
