//! Mock token exchange for development and testing.
//!
//! Pairs with `MockIdpServer`: the mock IdP encodes the signed-in account
//! into the authorization code, and this provider decodes it back.

use async_trait::async_trait;
use base64::Engine;
use gatehouse_core::auth::{
    AccessToken, ExchangeFailure, ExchangeResult, TokenExchangeClient, TokenGrant,
};

/// Mock provider that accepts codes minted by `MockIdpServer`.
#[derive(Debug, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenExchangeClient for MockProvider {
    async fn exchange_code(&self, code: &str) -> ExchangeResult {
        // Decode the mock code (it contains the account)
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| ExchangeFailure::Rejected(e.to_string()))?;

        let json: serde_json::Value = serde_json::from_slice(&decoded)
            .map_err(|e| ExchangeFailure::Rejected(e.to_string()))?;

        let account = json["account"]
            .as_str()
            .ok_or_else(|| ExchangeFailure::Rejected("no account in mock code".to_string()))?;

        Ok(TokenGrant {
            access_token: AccessToken::new(format!("mock-token-{account}")),
            account: Some(account.to_string()),
        })
    }
}

/// Encodes a mock authorization code for `account`.
pub(crate) fn mock_code(account: &str) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::json!({ "account": account }).to_string())
}
