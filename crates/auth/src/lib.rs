//! OAuth2 authorization code flow for gatehouse.
//!
//! This crate provides:
//! - The redirect flow engine (login, callback, logout)
//! - The unauthenticated-access guard middleware
//! - Session storage (in-memory, SQLite or Redis via feature flags)
//! - The token exchange client for the configured identity provider

mod config;
mod error;
mod extractors;
mod flow;
mod guard;
mod handlers;
mod locks;
mod providers;
mod sessions;
mod state;

pub use config::{AuthConfig, ProviderConfig};
pub use error::{AuthError, MessageBody};
pub use extractors::ClientSession;
pub use flow::{FlowEngine, SignedIn};
pub use guard::{intercept, require_access_token};
pub use handlers::{auth_routes, found};
#[cfg(feature = "mock")]
pub use providers::MockProvider;
pub use providers::AzureProvider;
pub use sessions::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
#[cfg(feature = "sqlite")]
pub use sessions::SqliteSessionStore;
pub use state::AuthState;

#[cfg(feature = "mock")]
pub mod mock_idp;
