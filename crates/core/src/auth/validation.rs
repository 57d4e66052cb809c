use url::Url;

/// Scheme and authority the current request was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    scheme: String,
    authority: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
        }
    }

    /// Origin for a plain `Host` header value.
    pub fn from_authority(authority: impl Into<String>) -> Self {
        Self::new("http", authority)
    }

    /// Base URL candidates are resolved against, or `None` if the
    /// authority is not a valid host.
    pub fn base_url(&self) -> Option<Url> {
        Url::parse(&format!("{}://{}/", self.scheme, self.authority)).ok()
    }

    pub fn hostname(&self) -> Option<String> {
        self.base_url()?.host_str().map(str::to_owned)
    }
}

/// Validates a "return to" candidate against the request origin to prevent
/// open redirects.
///
/// The candidate is resolved against the request's own scheme and host, so
/// relative paths are accepted. The result is `true` only when the resolved
/// URL is `http`/`https` and its hostname equals the origin's hostname.
///
/// # Examples
///
/// ```
/// use gatehouse_core::auth::{validate_redirect, RequestOrigin};
///
/// let origin = RequestOrigin::from_authority("app.example");
///
/// assert!(validate_redirect("/profile", &origin));
/// assert!(!validate_redirect("https://evil.example/steal", &origin));
/// assert!(!validate_redirect("//evil.example/steal", &origin));
/// ```
pub fn validate_redirect(candidate: &str, origin: &RequestOrigin) -> bool {
    // The URL parser silently strips tabs and newlines; refuse them instead.
    if candidate.chars().any(char::is_control) {
        return false;
    }

    let Some(base) = origin.base_url() else {
        return false;
    };
    let Some(expected) = base.host_str() else {
        return false;
    };

    match base.join(candidate) {
        Ok(resolved) => {
            matches!(resolved.scheme(), "http" | "https") && resolved.host_str() == Some(expected)
        }
        Err(_) => false,
    }
}

/// A destination that passed [`validate_redirect`].
///
/// Only obtainable through [`ReturnPath::validate`], so holding one is proof
/// the value is safe to store as a pending return path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPath(String);

impl ReturnPath {
    pub fn validate(candidate: &str, origin: &RequestOrigin) -> Option<Self> {
        validate_redirect(candidate, origin).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
