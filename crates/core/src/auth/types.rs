use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque session identifier carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer credential issued by the identity provider.
///
/// `Debug` is redacted so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Authentication state of one browser client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Present iff the client completed a token exchange and has not logged out.
    pub access_token: Option<AccessToken>,
    /// Same-origin destination captured by the guard, consumed once on callback.
    pub pending_return_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty (anonymous) session.
    pub fn new(id: SessionId, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id,
            access_token: None,
            pending_return_path: None,
            created_at,
            expires_at,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Successful result of exchanging an authorization code.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    /// Account name reported by the provider, when it reports one.
    pub account: Option<String>,
}

/// What the guard decided for an unauthenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The target was captured; send the browser to the login entry point.
    RedirectToLogin,
    /// The target failed same-origin validation; nothing was written.
    Rejected,
}

/// Result of a logout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    /// There was no token to clear. Not an error.
    NotLoggedIn,
}
