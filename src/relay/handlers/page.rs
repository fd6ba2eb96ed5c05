use crate::relay::{error::RelayError, handlers::present, upstream::AuthClient};
use askama::Template;
use axum::{
    extract::{Extension, Query},
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::form_urlencoded;

const RESET_PAGE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/reset.html"));

const RECOVERY: &str = "recovery";

/// Error page; askama escapes the message.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

/// Query string of the recovery link, plus the error fields the backend adds
/// when it redirects a failed link.
#[derive(Deserialize, Default)]
pub struct RecoveryQuery {
    token: Option<String>,
    token_hash: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    error_description: Option<String>,
}

impl std::fmt::Debug for RecoveryQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryQuery")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("token_hash", &self.token_hash.as_ref().map(|_| "***"))
            .field("type", &self.kind)
            .field("error_description", &self.error_description)
            .finish()
    }
}

// axum handler for the reset page; recovery links are verified before the page is shown
#[instrument(skip(client))]
pub async fn root(
    client: Extension<Arc<AuthClient>>,
    Query(query): Query<RecoveryQuery>,
) -> Response {
    if let Some(description) = present(query.error_description.as_deref()) {
        warn!("recovery link failed upstream: {description}");
        return error_page(StatusCode::BAD_REQUEST, description);
    }

    // The hash is what the backend's email template sends; plain `token` is accepted too.
    let Some(token_hash) =
        present(query.token_hash.as_deref()).or_else(|| present(query.token.as_deref()))
    else {
        return Html(RESET_PAGE).into_response();
    };

    if present(query.kind.as_deref()) != Some(RECOVERY) {
        return error_page(StatusCode::BAD_REQUEST, "Unsupported link type");
    }

    match client.recovery_session(token_hash).await {
        Ok(session) => {
            info!("recovery link verified");
            let mut fragment = form_urlencoded::Serializer::new(String::new());
            fragment.append_pair("access_token", &session.access_token);
            if let Some(refresh_token) = &session.refresh_token {
                fragment.append_pair("refresh_token", refresh_token);
            }
            fragment.append_pair("type", RECOVERY);

            let mut response = Redirect::to(&format!("/#{}", fragment.finish())).into_response();
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        Err(err) => error_page(err.status(), &err.to_string()),
    }
}

/// Render the error page with the given status.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    match (ErrorTemplate { message }).render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => RelayError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_template_escapes_message() {
        let rendered = ErrorTemplate {
            message: r#"<script>alert("x")</script> & more"#,
        }
        .render();
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("&lt;script&gt;alert("));
            assert!(body.contains("&amp; more"));
            assert!(!body.contains("<script>"));
        }
    }

    #[test]
    fn test_error_page_status() {
        let response = error_page(StatusCode::FORBIDDEN, "expired");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_pages_are_embedded() {
        assert!(RESET_PAGE.contains("reset-confirm"));
    }

    #[test]
    fn test_query_debug_hides_tokens() {
        let query = RecoveryQuery {
            token_hash: Some("pkce_secret".to_string()),
            kind: Some(RECOVERY.to_string()),
            ..RecoveryQuery::default()
        };
        let printed = format!("{query:?}");
        assert!(!printed.contains("pkce_secret"));
        assert!(printed.contains(RECOVERY));
    }
}
