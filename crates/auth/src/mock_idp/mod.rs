//! Mock identity provider for local development.
//!
//! Serves a sign-in page in place of the real authorization endpoint and
//! hands back codes that `MockProvider` can redeem.

mod server;
mod templates;

pub use server::MockIdpServer;
