//! Application state.

use anyhow::Result;
use gatehouse_auth::AuthState;

use crate::config::Config;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    /// Client for the profile endpoint, with the profile timeout applied.
    pub http: reqwest::Client,
    pub config: Config,
}

impl AppState {
    pub fn new(auth: AuthState, config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.profile_timeout)
            .build()?;

        Ok(Self { auth, http, config })
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}
