//! HTML for the mock sign-in page.

/// Escape HTML special characters to prevent XSS.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Sign-in page posting the chosen account back to `/authorize/submit`.
///
/// `redirect_uri` is shown for information only; the form never carries it.
pub fn sign_in_page(client_id: &str, redirect_uri: &str, scope: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock Sign In (DEV ONLY)</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 420px; margin: 80px auto; }}
        .banner {{ background: #fdecea; border: 1px solid #f5c2c7; padding: 12px; border-radius: 6px; }}
        input, button {{ width: 100%; padding: 10px; margin-top: 8px; box-sizing: border-box; }}
        dt {{ font-weight: 600; margin-top: 8px; }}
    </style>
</head>
<body>
    <p class="banner">Development identity provider. Any account name is accepted.</p>

    <dl>
        <dt>Application</dt><dd>{client_id}</dd>
        <dt>Requested scopes</dt><dd>{scope}</dd>
        <dt>Returns to</dt><dd>{redirect_uri}</dd>
    </dl>

    <form action="/authorize/submit" method="POST">
        <label for="account">Account</label>
        <input type="email" id="account" name="account" placeholder="dev@app.example" required />
        <button type="submit">Sign in</button>
    </form>
</body>
</html>"#,
        client_id = html_escape(client_id),
        redirect_uri = html_escape(redirect_uri),
        scope = html_escape(scope),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_page_escapes_values() {
        let page = sign_in_page("client", "http://app.example/cb?a=1&b=\"2\"", "openid");

        assert!(page.contains("http://app.example/cb?a=1&amp;b=&quot;2&quot;"));
        assert!(!page.contains("b=\"2\""));
    }
}
