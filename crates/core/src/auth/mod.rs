mod authorization;
mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use authorization::AuthorizationEndpoint;
pub use error::{AuthError, ExchangeFailure};
pub use functions::{
    calculate_expiry, complete_sign_in, generate_session_id, is_session_expired,
    DEFAULT_RETURN_PATH,
};
pub use traits::{ExchangeResult, Result, SessionRepository, TokenExchangeClient};
pub use types::{AccessToken, GuardOutcome, LogoutOutcome, Session, SessionId, TokenGrant};
pub use validation::{validate_redirect, RequestOrigin, ReturnPath};
