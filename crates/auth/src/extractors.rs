//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use gatehouse_core::auth::{generate_session_id, AccessToken, Session, SessionId};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::AuthState;

/// The caller's session, read from the session cookie.
///
/// Only ids the store knows are honoured. A caller without a cookie, or with
/// a cookie naming no live session, gets a freshly minted id and `jar`
/// carries the cookie to set. Handlers must return `jar` with their response
/// so the id sticks.
pub struct ClientSession {
    pub id: SessionId,
    pub jar: CookieJar,
    /// The stored record, when the cookie named one.
    pub session: Option<Session>,
}

impl ClientSession {
    pub async fn resolve(headers: &HeaderMap, state: &AuthState) -> Result<Self, AuthError> {
        let jar = CookieJar::from_headers(headers);

        let presented = jar
            .get(&state.config.cookie_name)
            .map(|cookie| SessionId::new(cookie.value().to_string()))
            .filter(|id| !id.as_str().is_empty());

        if let Some(id) = presented {
            if let Some(session) = state.engine.session(&id).await? {
                return Ok(Self {
                    id,
                    jar,
                    session: Some(session),
                });
            }
            tracing::debug!("Ignoring cookie for unknown session");
        }

        let id = generate_session_id();
        let jar = jar.add(session_cookie(&state.config, &id));
        Ok(Self {
            id,
            jar,
            session: None,
        })
    }

    /// The token bound to this session, if it is authenticated.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.session
            .as_ref()
            .and_then(|session| session.access_token.as_ref())
    }
}

/// Builds the session cookie for `id`.
pub(crate) fn session_cookie(config: &AuthConfig, id: &SessionId) -> Cookie<'static> {
    let max_age = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

impl<S> FromRequestParts<S> for ClientSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        Self::resolve(&parts.headers, &auth_state).await
    }
}
