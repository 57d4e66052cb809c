//! Signed-in user's profile.

use anyhow::Context;
use axum::{extract::State, Extension, Json};
use gatehouse_core::auth::AccessToken;
use serde_json::Value;

use super::error::AppError;
use crate::state::AppState;

/// GET /user - Profile of the signed-in user.
///
/// Forwards the session's access token to the profile endpoint and returns
/// its JSON unchanged. Only reachable behind `require_access_token`.
pub async fn profile(
    State(state): State<AppState>,
    Extension(token): Extension<AccessToken>,
) -> Result<Json<Value>, AppError> {
    let profile = fetch_profile(&state, &token)
        .await
        .context("Error getting user profile")?;

    Ok(Json(profile))
}

async fn fetch_profile(state: &AppState, token: &AccessToken) -> anyhow::Result<Value> {
    let response = state
        .http
        .get(state.config.profile_url.clone())
        .bearer_auth(token.secret())
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}
