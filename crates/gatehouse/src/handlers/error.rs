use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_auth::MessageBody;

pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Request failed");

        MessageBody::response(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0))
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
