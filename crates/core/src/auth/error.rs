use thiserror::Error;

/// Why a token exchange did not produce a credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeFailure {
    /// The provider answered the token request with an OAuth2 error.
    #[error("authorization code rejected: {0}")]
    Rejected(String),

    /// The provider redirected back with an error instead of a code.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// The token request never got a usable answer.
    #[error("token request failed: {0}")]
    Transport(String),

    #[error("token exchange timed out after {0}s")]
    TimedOut(u64),
}

impl ExchangeFailure {
    /// Whether the user can simply restart the login leg.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid redirect URL")]
    InvalidRedirect,

    #[error("missing authorization code")]
    MissingCode,

    #[error(transparent)]
    Exchange(#[from] ExchangeFailure),

    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(ExchangeFailure::TimedOut(10).is_retryable());
        assert!(!ExchangeFailure::Rejected("invalid_grant".into()).is_retryable());
        assert!(!ExchangeFailure::Provider("access_denied".into()).is_retryable());
        assert!(!ExchangeFailure::Transport("connection reset".into()).is_retryable());
    }

    #[test]
    fn invalid_redirect_message_is_client_facing() {
        assert_eq!(AuthError::InvalidRedirect.to_string(), "Invalid redirect URL");
    }
}
