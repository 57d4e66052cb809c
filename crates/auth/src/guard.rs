//! Unauthenticated-access guard.
//!
//! Sits in front of protected routes. Authenticated callers pass through with
//! their `AccessToken` in the request extensions; everyone else is either
//! sent to the login entry point with their target remembered, or refused
//! when the target does not belong to this host.

use axum::{
    extract::{OriginalUri, Request, State},
    http::header::HOST,
    middleware::Next,
    response::{IntoResponse, Response},
};
use gatehouse_core::auth::{
    AuthError as CoreError, GuardOutcome, RequestOrigin, ReturnPath, SessionId,
};

use crate::error::AuthError;
use crate::extractors::ClientSession;
use crate::flow::FlowEngine;
use crate::handlers::found;
use crate::AuthState;

/// Decides what happens to an unauthenticated request for `target`.
///
/// A target that fails validation is refused without touching the session.
/// Otherwise it becomes the session's pending return path.
pub async fn intercept(
    engine: &FlowEngine,
    id: &SessionId,
    target: &str,
    origin: &RequestOrigin,
) -> Result<GuardOutcome, AuthError> {
    let Some(path) = ReturnPath::validate(target, origin) else {
        tracing::warn!(session_id = %id, "Refusing to remember cross-origin return path");
        return Ok(GuardOutcome::Rejected);
    };

    tracing::debug!(session_id = %id, return_path = path.as_str(), "Redirecting to login");
    engine.capture_return_path(id, path).await?;

    Ok(GuardOutcome::RedirectToLogin)
}

/// Middleware requiring an authenticated session.
///
/// ```ignore
/// Router::new()
///     .route("/user", get(profile))
///     .route_layer(middleware::from_fn_with_state(auth_state, require_access_token))
/// ```
pub async fn require_access_token(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match ClientSession::resolve(request.headers(), &state).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    if let Some(token) = session.access_token() {
        request.extensions_mut().insert(token.clone());
        return next.run(request).await;
    }

    // Nested routers strip their prefix from `uri`; resume at the full path.
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    let origin = request_origin(&request);

    match intercept(&state.engine, &session.id, &target, &origin).await {
        Ok(GuardOutcome::RedirectToLogin) => {
            (session.jar, found(&state.config.login_path)).into_response()
        }
        Ok(GuardOutcome::Rejected) => AuthError::from(CoreError::InvalidRedirect).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The origin the client addressed, from the `Host` header.
fn request_origin(request: &Request) -> RequestOrigin {
    let scheme = request.uri().scheme_str().unwrap_or("http");
    let authority = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();

    RequestOrigin::new(scheme, authority)
}
