use url::Url;

/// Identity-provider authorization endpoint plus the client identity
/// registered with it.
#[derive(Debug, Clone)]
pub struct AuthorizationEndpoint {
    url: Url,
    client_id: String,
}

impl AuthorizationEndpoint {
    pub fn new(url: Url, client_id: impl Into<String>) -> Self {
        Self {
            url,
            client_id: client_id.into(),
        }
    }

    /// Builds the URL the browser is sent to for the login leg.
    ///
    /// Authorization Code flow, code returned in the query string. Existing
    /// query parameters on the endpoint (e.g. a tenant hint) are preserved.
    pub fn login_url(&self, redirect_uri: &Url, scopes: &[String]) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("response_mode", "query")
            .append_pair("scope", &scopes.join(" "));
        url
    }
}
