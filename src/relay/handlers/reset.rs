use crate::relay::{
    config::RelayConfig,
    error::{ErrorBody, RelayError},
    handlers::{present, valid_email, Message},
    upstream::AuthClient,
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequest {
    email: Option<String>,
}

#[utoipa::path(
    post,
    path= "/api/auth/user/reset",
    request_body = ResetRequest,
    responses (
        (status = 200, description = "Recovery email requested", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing or invalid email", body = ErrorBody),
        (status = 500, description = "Auth backend unreachable", body = ErrorBody),
    ),
    tag= "reset"
)]
// axum handler for sending the recovery email
#[instrument(skip(client, config, payload))]
pub async fn reset(
    client: Extension<Arc<AuthClient>>,
    config: Extension<Arc<RelayConfig>>,
    payload: Option<Json<ResetRequest>>,
) -> Result<Json<Message>, RelayError> {
    let email = payload
        .as_ref()
        .and_then(|Json(request)| present(request.email.as_deref()))
        .map(str::to_lowercase)
        .ok_or_else(|| RelayError::BadRequest("Email is required".to_string()))?;

    if !valid_email(&email) {
        return Err(RelayError::BadRequest("Invalid email".to_string()));
    }

    debug!("requesting recovery email");

    let response = client.recover(&email, config.redirect_url()).await?;

    if matches!(response.status, StatusCode::OK | StatusCode::CREATED) {
        info!("recovery email requested");
        Ok(Json(Message::new("Reset email sent")))
    } else {
        warn!("recover rejected with status {}", response.status);
        Err(response.into_error("Failed to send reset email"))
    }
}
