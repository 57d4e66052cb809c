use std::time::Duration;

use url::Url;

use crate::error::AuthError;

/// Path of the login entry point, relative to the route prefix.
const LOGIN_PATH: &str = "/auth/login";

/// Configuration for the identity provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: Url,
    pub token_url: Url,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub provider: ProviderConfig,
    pub session_ttl: Duration,
    pub exchange_timeout: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// Absolute path the guard sends unauthenticated callers to.
    pub login_path: String,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AZURE_CLIENT_ID`: Application (client) ID (required)
    /// - `AZURE_CLIENT_SECRET`: Client secret (required)
    /// - `AZURE_TENANT_ID`: Directory (tenant) ID (required)
    /// - `AZURE_REDIRECT_URI`: Callback URL registered with the provider (required)
    /// - `AZURE_AUTHORITY`: Authority host (default: `https://login.microsoftonline.com`)
    /// - `AZURE_SCOPES`: Space or comma separated scopes (default: `openid profile User.Read`)
    /// - `SESSION_TTL_SECONDS`: Session and cookie lifetime, 1 to [`MAX_SESSION_TTL`] (default: 86400)
    /// - `EXCHANGE_TIMEOUT_SECONDS`: Token exchange timeout (default: 10)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: true)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a required variable is missing, a URL
    /// does not parse, or the session TTL is out of range. Callers treat this
    /// as fatal at startup.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} must be set")))
        };
        let parse_url = |key: &str, raw: &str| {
            Url::parse(raw).map_err(|e| AuthError::Config(format!("{key} is not a valid URL: {e}")))
        };

        let client_id = required("AZURE_CLIENT_ID")?;
        let client_secret = required("AZURE_CLIENT_SECRET")?;
        let tenant_id = required("AZURE_TENANT_ID")?;
        let redirect_uri = parse_url("AZURE_REDIRECT_URI", &required("AZURE_REDIRECT_URI")?)?;

        let authority = lookup("AZURE_AUTHORITY")
            .unwrap_or_else(|| "https://login.microsoftonline.com".to_string());
        let authority = authority.trim_end_matches('/');
        let authorize_url = parse_url(
            "AZURE_AUTHORITY",
            &format!("{authority}/{tenant_id}/oauth2/v2.0/authorize"),
        )?;
        let token_url = parse_url(
            "AZURE_AUTHORITY",
            &format!("{authority}/{tenant_id}/oauth2/v2.0/token"),
        )?;

        let scopes = lookup("AZURE_SCOPES")
            .map(|raw| parse_scopes(&raw))
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(|| parse_scopes("openid profile User.Read"));

        let session_ttl = match lookup("SESSION_TTL_SECONDS") {
            Some(raw) => parse_session_ttl(&raw)?,
            None => Duration::from_secs(24 * 60 * 60), // 1 day default
        };

        let exchange_timeout = lookup("EXCHANGE_TIMEOUT_SECONDS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            provider: ProviderConfig {
                client_id,
                client_secret,
                authorize_url,
                token_url,
                redirect_uri,
                scopes,
            },
            session_ttl,
            exchange_timeout,
            cookie_name: "session".to_string(),
            cookie_secure,
            login_path: LOGIN_PATH.to_string(),
        })
    }

    /// Mounts the login entry point under a global route prefix such as `/api/v1`.
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        self.login_path = format!("{}{}", prefix.trim_end_matches('/'), LOGIN_PATH);
        self
    }
}

/// Upper bound for `SESSION_TTL_SECONDS`: 400 days, the longest cookie
/// lifetime browsers honor.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(400 * 24 * 60 * 60);

fn parse_session_ttl(raw: &str) -> Result<Duration, AuthError> {
    let secs = raw.trim().parse::<u64>().map_err(|e| {
        AuthError::Config(format!("SESSION_TTL_SECONDS is not a number of seconds: {e}"))
    })?;
    let ttl = Duration::from_secs(secs);

    if ttl.is_zero() || ttl > MAX_SESSION_TTL {
        return Err(AuthError::Config(format!(
            "SESSION_TTL_SECONDS must be between 1 and {}",
            MAX_SESSION_TTL.as_secs()
        )));
    }

    Ok(ttl)
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
