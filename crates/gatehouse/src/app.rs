use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use gatehouse_auth::{auth_routes, require_access_token};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{health::livez, profile::profile},
    state::AppState,
};

/// Normalizes a route prefix to `/segment/...`, or `""` for none.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Create the application router with all routes and middleware.
///
/// `prefix` must already be normalized with [`normalize_prefix`].
pub fn create_app(state: AppState, prefix: &str) -> Router {
    // Routes behind the unauthenticated-access guard
    let protected = Router::new()
        .route("/user", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_access_token,
        ));

    let api = Router::new()
        .merge(protected)
        .merge(auth_routes().with_state(state.auth.clone()));

    let api = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    // Main application router
    api.route("/livez", get(livez))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}
