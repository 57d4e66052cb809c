use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{AccessToken, Session, SessionId};

/// Where a caller lands after sign-in when nothing was captured.
pub const DEFAULT_RETURN_PATH: &str = "/";

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Binds a freshly exchanged token to the session and consumes the pending
/// return path.
///
/// Returns the destination to resume at. The pending path is cleared in the
/// same step, so replaying a callback lands on [`DEFAULT_RETURN_PATH`].
pub fn complete_sign_in(session: &mut Session, token: AccessToken) -> String {
    session.access_token = Some(token);
    session
        .pending_return_path
        .take()
        .unwrap_or_else(|| DEFAULT_RETURN_PATH.to_string())
}
