use crate::relay::{
    error::{ErrorBody, RelayError},
    upstream::AuthClient,
};
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Bearer token from an `Authorization` header, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[utoipa::path(
    get,
    path= "/api/auth/user",
    responses (
        (status = 200, description = "User owning the bearer token, as returned by the auth backend"),
        (status = 401, description = "Missing bearer token", body = ErrorBody),
    ),
    tag= "reset"
)]
// axum handler that shows which account a recovery session belongs to
#[instrument(skip(client, headers))]
pub async fn get_user(
    client: Extension<Arc<AuthClient>>,
    headers: HeaderMap,
) -> Result<Json<Value>, RelayError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| RelayError::Unauthorized("Missing bearer token".to_string()))?;

    let response = client.get_user(token).await?;

    if response.status == StatusCode::OK {
        Ok(Json(response.body))
    } else {
        warn!("user lookup rejected with status {}", response.status);
        Err(response.into_error("Failed to fetch user"))
    }
}
