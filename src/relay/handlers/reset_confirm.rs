use crate::relay::{
    error::{ErrorBody, RelayError},
    handlers::{present, valid_password_length, Message},
    upstream::AuthClient,
};
use axum::{extract::Extension, http::StatusCode, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// Either `token` (an access token used as is) or `token_hash` (verified
/// against the backend first) must be present.
#[derive(ToSchema, Deserialize, Debug)]
pub struct ConfirmRequest {
    token: Option<String>,
    token_hash: Option<String>,
    #[schema(value_type = Option<String>)]
    new_password: Option<SecretString>,
}

enum Credential<'a> {
    Token(&'a str),
    TokenHash(&'a str),
}

impl ConfirmRequest {
    // A plain token wins when both are sent.
    fn credential(&self) -> Option<Credential<'_>> {
        present(self.token.as_deref())
            .map(Credential::Token)
            .or_else(|| present(self.token_hash.as_deref()).map(Credential::TokenHash))
    }

    fn new_password(&self) -> Option<&SecretString> {
        self.new_password
            .as_ref()
            .filter(|password| !password.expose_secret().is_empty())
    }
}

#[utoipa::path(
    post,
    path= "/api/auth/user/reset-confirm",
    request_body = ConfirmRequest,
    responses (
        (status = 200, description = "Password updated", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing token or password, or password too short", body = ErrorBody),
        (status = 500, description = "Auth backend unreachable", body = ErrorBody),
        (status = 502, description = "Auth backend answered without the expected status", body = ErrorBody),
    ),
    tag= "reset"
)]
// axum handler for completing the reset with the recovery token
#[instrument(skip(client, payload))]
pub async fn reset_confirm(
    client: Extension<Arc<AuthClient>>,
    payload: Option<Json<ConfirmRequest>>,
) -> Result<Json<Message>, RelayError> {
    let missing = || RelayError::BadRequest("Token and new password are required".to_string());

    let Some(Json(request)) = payload else {
        return Err(missing());
    };

    let (Some(credential), Some(new_password)) = (request.credential(), request.new_password())
    else {
        return Err(missing());
    };

    if !valid_password_length(new_password.expose_secret()) {
        return Err(RelayError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let bearer = match credential {
        Credential::Token(token) => token.to_string(),
        Credential::TokenHash(token_hash) => client.recovery_session(token_hash).await?.access_token,
    };

    debug!("updating password");

    let response = client.update_password(&bearer, new_password).await?;

    if response.status == StatusCode::OK {
        info!("password updated");
        Ok(Json(Message::new("Password updated successfully")))
    } else {
        warn!("password update rejected with status {}", response.status);
        Err(response.into_error("Failed to update password"))
    }
}
