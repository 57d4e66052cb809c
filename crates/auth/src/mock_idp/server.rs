//! Mock IdP server for development and testing.
//!
//! Stands in for the tenant's authorization endpoint so the whole redirect
//! flow can run locally.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

use super::templates;
use crate::error::MessageBody;
use crate::handlers::found;
use crate::providers::mock_code;

#[derive(Deserialize)]
struct AuthorizeQuery {
    client_id: String,
    redirect_uri: String,
    #[serde(default)]
    scope: String,
}

#[derive(Deserialize)]
struct SignInForm {
    account: String,
}

/// Mock IdP server that simulates the authorization endpoint.
///
/// Like a real tenant it only ever redirects to the one callback URL
/// registered for the application.
pub struct MockIdpServer {
    port: u16,
    redirect_uri: Url,
}

impl MockIdpServer {
    /// Create a new Mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    /// * `redirect_uri` - The registered callback URL
    pub fn new(port: u16, redirect_uri: Url) -> Self {
        Self { port, redirect_uri }
    }

    /// Run the Mock IdP server.
    ///
    /// Routes:
    /// - `GET /authorize` - Sign-in page
    /// - `POST /authorize/submit` - Redirects to the callback with a mock code
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router(self.redirect_uri)).await
    }
}

fn router(redirect_uri: Url) -> Router {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/authorize/submit", post(authorize_submit))
        .with_state(Arc::new(redirect_uri))
}

async fn authorize(
    State(registered): State<Arc<Url>>,
    Query(params): Query<AuthorizeQuery>,
) -> Response {
    let matches = Url::parse(&params.redirect_uri).is_ok_and(|uri| uri == *registered);
    if !matches {
        tracing::warn!(redirect_uri = %params.redirect_uri, "Mock IdP refused unregistered redirect_uri");
        return MessageBody::response(StatusCode::BAD_REQUEST, "Unregistered redirect_uri");
    }

    Html(templates::sign_in_page(
        &params.client_id,
        registered.as_str(),
        &params.scope,
    ))
    .into_response()
}

/// Redirects to the registered callback; the form cannot choose the target.
async fn authorize_submit(
    State(registered): State<Arc<Url>>,
    Form(form): Form<SignInForm>,
) -> Response {
    let code = mock_code(&form.account);

    found(&format!(
        "{}{}code={}",
        registered,
        if registered.query().is_some() { '&' } else { '?' },
        urlencoding::encode(&code)
    ))
}
