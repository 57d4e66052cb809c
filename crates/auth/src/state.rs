//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use gatehouse_core::auth::{SessionRepository, TokenExchangeClient};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::flow::FlowEngine;

#[cfg(not(feature = "mock"))]
use crate::providers::AzureProvider;

#[cfg(feature = "mock")]
use crate::providers::MockProvider;

/// Where `MockIdpServer` serves its authorization page.
#[cfg(feature = "mock")]
pub const MOCK_IDP_AUTHORIZE_URL: &str = "http://localhost:3001/authorize";

/// Shared state for auth handlers and the guard.
#[derive(Clone)]
pub struct AuthState {
    pub engine: FlowEngine,
    pub config: AuthConfig,
}

impl AuthState {
    /// Creates the state with the configured identity provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the provider cannot be set up.
    #[cfg(not(feature = "mock"))]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let exchange = Arc::new(AzureProvider::new(&config.provider));
        Ok(Self::with_exchange_client(sessions, exchange, config))
    }

    /// Creates the state against the local mock IdP.
    ///
    /// The login leg is pointed at `MockIdpServer`, whose codes are only
    /// understood by `MockProvider`.
    #[cfg(feature = "mock")]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        mut config: AuthConfig,
    ) -> Result<Self, AuthError> {
        config.provider.authorize_url = url::Url::parse(MOCK_IDP_AUTHORIZE_URL)
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self::with_exchange_client(
            sessions,
            Arc::new(MockProvider::new()),
            config,
        ))
    }

    /// Creates the state with an explicit token exchange client.
    pub fn with_exchange_client(
        sessions: Arc<dyn SessionRepository>,
        exchange: Arc<dyn TokenExchangeClient>,
        config: AuthConfig,
    ) -> Self {
        Self {
            engine: FlowEngine::new(sessions, exchange, &config),
            config,
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
