//! Credential embedding for clone/fetch URLs
//!
//! Tokens are embedded as `oauth2:<token>@host`, which GitLab accepts for
//! HTTPS git transport. The resulting URL is wrapped in [`SecretUrl`] so it
//! cannot end up in logs by accident.

use std::fmt;
use url::Url;

const REDACTED: &str = "***";

/// A transport URL that may carry credentials.
///
/// `Display` and `Debug` redact the password; only [`SecretUrl::expose`]
/// returns the raw value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretUrl(String);

impl SecretUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Raw URL, for passing to git. Never log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// URL with any password replaced by `***`.
    pub fn redacted(&self) -> String {
        redact_url(&self.0)
    }
}

impl fmt::Display for SecretUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for SecretUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretUrl").field(&self.redacted()).finish()
    }
}

/// Return an authenticated URL for git clone/fetch.
///
/// Only `https` URLs are rewritten. Query and fragment are dropped, and any
/// userinfo already present is replaced.
pub fn embed_token(url: &str, token: &str) -> SecretUrl {
    if token.is_empty() {
        return SecretUrl::new(url);
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return SecretUrl::new(url),
    };
    if parsed.scheme() != "https" {
        return SecretUrl::new(url);
    }
    let host = match parsed.host_str() {
        Some(host) => host,
        None => return SecretUrl::new(url),
    };

    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    SecretUrl::new(format!(
        "https://oauth2:{}@{}{}",
        urlencoding::encode(token),
        authority,
        parsed.path()
    ))
}

/// Replace the password component of a URL-looking string with `***`.
///
/// Strings that do not parse as URLs, or carry no password, are returned
/// unchanged.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(REDACTED)).is_ok() {
                parsed.to_string()
            } else {
                raw.to_string()
            }
        }
        _ => raw.to_string(),
    }
}

/// Scrub a token, raw and percent-encoded, from arbitrary text such as git
/// stderr.
pub fn redact_secret(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    let encoded = urlencoding::encode(token);
    let scrubbed = text.replace(encoded.as_ref(), REDACTED);
    scrubbed.replace(token, REDACTED)
}
