//! Token exchange clients.
//!
//! This module contains implementations of `TokenExchangeClient` for:
//! - Microsoft identity platform (OAuth2 v2.0 endpoints)
//! - A mock provider paired with the Mock IdP (with `mock` feature)

mod azure;
#[cfg(feature = "mock")]
mod mock;

pub use azure::AzureProvider;
#[cfg(feature = "mock")]
pub(crate) use mock::mock_code;
#[cfg(feature = "mock")]
pub use mock::MockProvider;
