//! HTTP handlers for auth routes.

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::Cookie;
use gatehouse_core::auth::{AuthError as CoreError, ExchangeFailure, LogoutOutcome};
use serde::Deserialize;

use crate::error::{AuthError, MessageBody};
use crate::extractors::{session_cookie, ClientSession};
use crate::AuthState;

/// Query parameters the identity provider sends back to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth/login` - Redirect to the identity provider
/// - `GET /auth/callback` - Exchange the code and resume where the caller left off
/// - `GET /auth/logout` - End the current session
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", get(logout))
}

/// A `302 Found` redirect.
///
/// `axum::response::Redirect::to` answers `303 See Other`; browsers treat both
/// the same for `GET`, but the login leg is a plain 302.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

async fn login(State(state): State<AuthState>) -> Response {
    found(state.engine.login_url().as_str())
}

async fn callback(
    State(state): State<AuthState>,
    session: ClientSession,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AuthError> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(session_id = %session.id, error = %error, "Identity provider returned an error");
        return Err(ExchangeFailure::Provider(format!("{error}: {description}")).into());
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(CoreError::MissingCode)?;

    match state.engine.complete_callback(&session.id, &code).await {
        Ok(signed_in) => {
            let jar = session
                .jar
                .add(session_cookie(&state.config, &signed_in.session_id));
            Ok((jar, found(&signed_in.destination)).into_response())
        }
        // Timeouts send the caller round again instead of failing the request.
        Err(AuthError::Core(CoreError::Exchange(failure))) if failure.is_retryable() => {
            Ok((session.jar, found(&state.config.login_path)).into_response())
        }
        Err(e) => Err(e),
    }
}

async fn logout(
    State(state): State<AuthState>,
    session: ClientSession,
) -> Result<Response, AuthError> {
    match state.engine.logout(&session.id).await? {
        LogoutOutcome::LoggedOut => {
            let jar = session
                .jar
                .remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
            Ok((
                jar,
                MessageBody::response(StatusCode::OK, "Logged out successfully."),
            )
                .into_response())
        }
        LogoutOutcome::NotLoggedIn => Ok(MessageBody::response(
            StatusCode::BAD_REQUEST,
            "User not logged in.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request},
    };
    use gatehouse_core::auth::{
        AccessToken, RequestOrigin, SessionId, SessionRepository, TokenExchangeClient,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::flow::tests::{test_config, HangingExchange, StaticExchange};
    use crate::guard::intercept;
    use crate::sessions::InMemorySessionStore;

    struct Harness {
        store: InMemorySessionStore,
        exchange: Arc<StaticExchange>,
        state: AuthState,
    }

    fn harness() -> Harness {
        let store = InMemorySessionStore::new();
        let exchange = Arc::new(StaticExchange::default());
        let state = AuthState::with_exchange_client(
            Arc::new(store.clone()),
            exchange.clone(),
            test_config(),
        );
        Harness {
            store,
            exchange,
            state,
        }
    }

    fn sid() -> SessionId {
        SessionId::new("session-1".to_string())
    }

    async fn get(state: &AuthState, uri: &str) -> Response {
        get_with_session(state, uri, &sid()).await
    }

    async fn get_with_session(state: &AuthState, uri: &str, id: &SessionId) -> Response {
        auth_routes()
            .with_state(state.clone())
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::HOST, "app.example")
                    .header(header::COOKIE, format!("session={id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn session_cookie_value(response: &Response) -> SessionId {
        let value = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.strip_prefix("session="))
            .last()
            .unwrap();
        SessionId::new(value.to_string())
    }

    async fn message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: MessageBody = serde_json::from_slice(&body).unwrap();
        body.message
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    // ==================== Login ====================

    #[tokio::test]
    async fn test_login_redirects_to_identity_provider() {
        let h = harness();

        let response = get(&h.state, "/auth/login").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let target = url::Url::parse(location(&response)).unwrap();
        assert_eq!(target.host_str(), Some("login.example"));
        assert!(target
            .query_pairs()
            .any(|(k, v)| k == "client_id" && v == "client-123"));
        assert!(h.store.get(&sid()).await.unwrap().is_none());
    }

    // ==================== Callback ====================

    #[tokio::test]
    async fn test_callback_resumes_at_pending_path() {
        let h = harness();
        intercept(
            &h.state.engine,
            &sid(),
            "/profile",
            &RequestOrigin::from_authority("app.example"),
        )
        .await
        .unwrap();

        let response = get(&h.state, "/auth/callback?code=abc").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/profile");
        let id = session_cookie_value(&response);
        let session = h.store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.access_token, Some(AccessToken::new("T".to_string())));
        assert_eq!(session.pending_return_path, None);

        let replay = get_with_session(&h.state, "/auth/callback?code=abc", &id).await;
        assert_eq!(location(&replay), "/");
    }

    #[tokio::test]
    async fn test_callback_issues_new_session_cookie() {
        let h = harness();
        intercept(
            &h.state.engine,
            &sid(),
            "/profile",
            &RequestOrigin::from_authority("app.example"),
        )
        .await
        .unwrap();

        let response = get(&h.state, "/auth/callback?code=abc").await;

        let id = session_cookie_value(&response);
        assert_ne!(id, sid());
        assert!(h.store.get(&sid()).await.unwrap().is_none());
        assert!(h.store.get(&id).await.unwrap().unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn test_callback_with_planted_cookie_does_not_authenticate_it() {
        let h = harness();
        let planted = SessionId::new("attacker-fixed".to_string());

        let response = get_with_session(&h.state, "/auth/callback?code=abc", &planted).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let id = session_cookie_value(&response);
        assert_ne!(id, planted);
        assert!(h.store.get(&planted).await.unwrap().is_none());
        assert!(h.store.get(&id).await.unwrap().unwrap().is_authenticated());

        let logout = get_with_session(&h.state, "/auth/logout", &planted).await;
        assert_eq!(logout.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_exchange_failure_is_server_error() {
        let h = harness();

        let response = get(&h.state, "/auth/callback?code=bogus").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message(response).await, "Error exchanging authorization code.");
        assert!(h.store.get(&sid()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_callback_with_provider_error_skips_exchange() {
        let h = harness();

        let response = get(
            &h.state,
            "/auth/callback?error=access_denied&error_description=user+cancelled",
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(h.exchange.calls.load(Ordering::SeqCst), 0);
        assert!(h.store.get(&sid()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_callback_without_code_is_bad_request() {
        let h = harness();

        let response = get(&h.state, "/auth/callback").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(response).await, "Missing authorization code");
    }

    #[tokio::test]
    async fn test_callback_timeout_sends_caller_back_to_login() {
        let store = InMemorySessionStore::new();
        let exchange: Arc<dyn TokenExchangeClient> = Arc::new(HangingExchange);
        let state = AuthState::with_exchange_client(Arc::new(store.clone()), exchange, test_config());

        let response = get(&state, "/auth/callback?code=abc").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login");
        assert!(store.get(&sid()).await.unwrap().is_none());
    }

    // ==================== Logout ====================

    #[tokio::test]
    async fn test_logout_twice() {
        let h = harness();
        let id = h
            .state
            .engine
            .complete_callback(&sid(), "abc")
            .await
            .unwrap()
            .session_id;

        let first = get_with_session(&h.state, "/auth/logout", &id).await;
        assert_eq!(first.status(), StatusCode::OK);
        let cleared = first.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("session="));
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(message(first).await, "Logged out successfully.");

        let second = get_with_session(&h.state, "/auth/logout", &id).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(second).await, "User not logged in.");
    }

    #[tokio::test]
    async fn test_logout_without_token_is_not_logged_in() {
        let h = harness();

        let response = get(&h.state, "/auth/logout").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(response).await, "User not logged in.");
    }
}
