//! Microsoft identity platform token exchange.

use async_trait::async_trait;
use gatehouse_core::auth::{
    AccessToken, ExchangeFailure, ExchangeResult, TokenExchangeClient, TokenGrant,
};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
};

use crate::config::ProviderConfig;

/// Confidential OAuth2 client for the configured tenant.
pub struct AzureProvider {
    client: BasicClient,
    scopes: String,
}

impl AzureProvider {
    /// Builds the client from configuration. No network access.
    pub fn new(config: &ProviderConfig) -> Self {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::from_url(config.authorize_url.clone()),
            Some(TokenUrl::from_url(config.token_url.clone())),
        )
        .set_redirect_uri(RedirectUrl::from_url(config.redirect_uri.clone()));

        Self {
            client,
            scopes: config.scopes.join(" "),
        }
    }
}

#[async_trait]
impl TokenExchangeClient for AzureProvider {
    async fn exchange_code(&self, code: &str) -> ExchangeResult {
        // The v2.0 token endpoint wants the scopes repeated on redemption.
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .add_extra_param("scope", self.scopes.clone())
            .request_async(async_http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    ExchangeFailure::Rejected(response.to_string())
                }
                RequestTokenError::Request(err) => ExchangeFailure::Transport(err.to_string()),
                other => ExchangeFailure::Provider(other.to_string()),
            })?;

        Ok(TokenGrant {
            access_token: AccessToken::new(token_response.access_token().secret().clone()),
            account: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> AzureProvider {
        let base = Url::parse(&server.uri()).unwrap();
        AzureProvider::new(&ProviderConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            authorize_url: base.join("/tenant/oauth2/v2.0/authorize").unwrap(),
            token_url: base.join("/tenant/oauth2/v2.0/token").unwrap(),
            redirect_uri: Url::parse("http://app.example/auth/callback").unwrap(),
            scopes: vec!["openid".to_string(), "User.Read".to_string()],
        })
    }

    #[tokio::test]
    async fn test_exchange_code_returns_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant/oauth2/v2.0/token"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T",
                "token_type": "bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = provider(&server).exchange_code("abc").await.unwrap();

        assert_eq!(grant.access_token.secret(), "T");
    }

    #[tokio::test]
    async fn test_exchange_code_rejected_by_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "code expired",
            })))
            .mount(&server)
            .await;

        let err = provider(&server).exchange_code("stale").await.unwrap_err();

        assert!(matches!(err, ExchangeFailure::Rejected(ref m) if m.contains("invalid_grant")));
    }
}
