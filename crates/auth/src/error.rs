use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::auth::ExchangeFailure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auth errors for the gatehouse_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (validation, exchange, storage)
    #[error(transparent)]
    Core(#[from] gatehouse_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The session store could not destroy a signed-in session.
    #[error("Error logging out: {0}")]
    Logout(String),
}

impl From<ExchangeFailure> for AuthError {
    fn from(failure: ExchangeFailure) -> Self {
        AuthError::Core(failure.into())
    }
}

/// JSON body shared by every auth response that carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(MessageBody {
                message: message.into(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use gatehouse_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidRedirect => (StatusCode::BAD_REQUEST, self.to_string()),
                CoreError::MissingCode => (
                    StatusCode::BAD_REQUEST,
                    "Missing authorization code".to_string(),
                ),
                CoreError::Exchange(failure) if failure.is_retryable() => {
                    tracing::warn!("Auth error: {}", self);
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "Identity provider did not respond, please sign in again.".to_string(),
                    )
                }
                CoreError::Exchange(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error exchanging authorization code.".to_string(),
                    )
                }
                CoreError::Storage(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::Logout(_) => {
                tracing::error!("Auth error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        MessageBody::response(status, message)
    }
}
