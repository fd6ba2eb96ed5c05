use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Every call to the auth backend is bounded by this timeout.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// CORS origin policy for browser callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    Any,
    Exact(HeaderValue),
}

/// Startup configuration handed to the server and its handlers.
#[derive(Clone)]
pub struct RelayConfig {
    auth_url: Url,
    api_key: SecretString,
    redirect_url: Url,
    allowed_origin: AllowedOrigin,
}

impl RelayConfig {
    /// Validate and build the relay configuration.
    ///
    /// # Errors
    /// Returns an error if a URL is malformed, the API key is empty, or the
    /// allowed origin is neither `*` nor a valid origin URL.
    pub fn new(
        auth_url: &str,
        api_key: SecretString,
        redirect_url: &str,
        allowed_origin: &str,
    ) -> Result<Self> {
        let auth_url = parse_http_url(auth_url).context("Invalid auth backend URL")?;
        let redirect_url = parse_http_url(redirect_url).context("Invalid redirect URL")?;

        if api_key.expose_secret().trim().is_empty() {
            return Err(anyhow!("Auth backend API key must not be empty"));
        }

        let allowed_origin = if allowed_origin.trim() == "*" {
            AllowedOrigin::Any
        } else {
            AllowedOrigin::Exact(origin_header(allowed_origin)?)
        };

        Ok(Self {
            auth_url,
            api_key,
            redirect_url,
            allowed_origin,
        })
    }

    /// Backend base URL without a trailing slash, e.g. `https://xxxxx.supabase.co`.
    #[must_use]
    pub fn auth_base_url(&self) -> &str {
        self.auth_url.as_str().trim_end_matches('/')
    }

    #[must_use]
    pub const fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    #[must_use]
    pub fn redirect_url(&self) -> &str {
        self.redirect_url.as_str()
    }

    #[must_use]
    pub const fn allowed_origin(&self) -> &AllowedOrigin {
        &self.allowed_origin
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("auth_url", &self.auth_url.as_str())
            .field("api_key", &"***")
            .field("redirect_url", &self.redirect_url.as_str())
            .field("allowed_origin", &self.allowed_origin)
            .finish()
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw.trim()).with_context(|| format!("Unable to parse URL: {raw}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("URL must use http or https: {raw}"));
    }

    if parsed.host_str().is_none() {
        return Err(anyhow!("URL must include a valid host: {raw}"));
    }

    Ok(parsed)
}

fn origin_header(raw: &str) -> Result<HeaderValue> {
    let parsed = parse_http_url(raw).context("Invalid allowed origin")?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {raw}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build allowed origin header")
}
