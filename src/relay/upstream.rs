//! Client for the external auth backend.
//!
//! The backend speaks a GoTrue-style REST API under `/auth/v1`. Every request
//! carries the static API key in the `apikey` header; user-scoped requests add
//! the caller's token as `Authorization: Bearer <token>`.

use crate::{
    relay::{
        config::{RelayConfig, UPSTREAM_TIMEOUT},
        error::RelayError,
    },
    APP_USER_AGENT,
};
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info_span, warn, Instrument};

const RECOVER_PATH: &str = "/auth/v1/recover";
const VERIFY_PATH: &str = "/auth/v1/verify";
const USER_PATH: &str = "/auth/v1/user";

// Keys the backend uses for human-readable errors, in order of preference.
const ERROR_KEYS: [&str; 4] = ["msg", "error_description", "message", "error"];

/// Status and decoded body of a backend reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

impl UpstreamResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Best-effort error message, falling back to `default`.
    #[must_use]
    pub fn error_message(&self, default: &str) -> String {
        ERROR_KEYS
            .iter()
            .find_map(|key| self.str_field(key))
            .unwrap_or(default)
            .to_string()
    }

    /// Turn the reply into a pass-through error with the backend status.
    ///
    /// Only 4xx/5xx statuses are forwarded; an unexpected 1xx/2xx/3xx reply
    /// (a 204 would lose the error body) becomes `502 Bad Gateway`.
    #[must_use]
    pub fn into_error(self, default: &str) -> RelayError {
        let status = if self.status.is_client_error() || self.status.is_server_error() {
            self.status
        } else {
            StatusCode::BAD_GATEWAY
        };

        RelayError::Upstream {
            message: self.error_message(default),
            status,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.str_field("access_token")
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.str_field("refresh_token")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.body
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Session granted by a verified recovery token.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoverySession {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for RecoverySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoverySession")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Shared HTTP client for the auth backend, built once at startup.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl AuthClient {
    /// Build the client with the fixed upstream timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Error creating reqwest client")?;

        Ok(Self {
            client,
            base_url: config.auth_base_url().to_string(),
            api_key: config.api_key().clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Ask the backend to email a recovery link that lands on `redirect_to`.
    ///
    /// # Errors
    /// Returns [`RelayError::Network`] if the backend cannot be reached.
    pub async fn recover(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<UpstreamResponse, RelayError> {
        let request = self.client.post(self.url(RECOVER_PATH)).json(&json!({
            "email": email,
            "options": { "redirectTo": redirect_to },
        }));

        self.send(request, "recover").await
    }

    /// Exchange a recovery token hash for a session.
    ///
    /// # Errors
    /// Returns [`RelayError::Network`] if the backend cannot be reached.
    pub async fn verify_recovery(&self, token_hash: &str) -> Result<UpstreamResponse, RelayError> {
        let request = self.client.post(self.url(VERIFY_PATH)).json(&json!({
            "type": "recovery",
            "token_hash": token_hash,
        }));

        self.send(request, "verify").await
    }

    /// Verify a recovery token hash and return the session it grants.
    ///
    /// # Errors
    /// Passes backend failures through with their status; a successful reply
    /// without an access token is reported as an unexpected response.
    pub async fn recovery_session(&self, token_hash: &str) -> Result<RecoverySession, RelayError> {
        let response = self.verify_recovery(token_hash).await?;

        if !response.status.is_success() {
            warn!(
                "recovery verification rejected with status {}",
                response.status
            );
            return Err(response.into_error("Invalid or expired recovery token"));
        }

        let Some(access_token) = response.access_token().map(str::to_string) else {
            warn!("recovery verification returned no access token");
            return Err(RelayError::UnexpectedResponse(
                "Failed to verify recovery token".to_string(),
            ));
        };

        Ok(RecoverySession {
            access_token,
            refresh_token: response.refresh_token().map(str::to_string),
        })
    }

    /// Set a new password for the user owning `bearer`.
    ///
    /// # Errors
    /// Returns [`RelayError::Network`] if the backend cannot be reached.
    pub async fn update_password(
        &self,
        bearer: &str,
        password: &SecretString,
    ) -> Result<UpstreamResponse, RelayError> {
        let request = self
            .client
            .put(self.url(USER_PATH))
            .bearer_auth(bearer)
            .json(&json!({ "password": password.expose_secret() }));

        self.send(request, "update_user").await
    }

    /// Fetch the user owning `bearer`.
    ///
    /// # Errors
    /// Returns [`RelayError::Network`] if the backend cannot be reached.
    pub async fn get_user(&self, bearer: &str) -> Result<UpstreamResponse, RelayError> {
        let request = self.client.get(self.url(USER_PATH)).bearer_auth(bearer);

        self.send(request, "get_user").await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<UpstreamResponse, RelayError> {
        let span = info_span!(
            "upstream.request",
            upstream.operation = operation,
            upstream.status = tracing::field::Empty
        );

        async {
            let response = request
                .header("apikey", self.api_key.expose_secret())
                .send()
                .await?;

            let status = response.status();
            tracing::Span::current().record("upstream.status", status.as_u16());

            let bytes = response.bytes().await?;
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

            debug!("{operation} answered {status}");

            Ok::<_, RelayError>(UpstreamResponse::new(status, body))
        }
        .instrument(span)
        .await
    }
}
