use crate::cli::telemetry;
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod config;
pub mod error;
pub mod handlers;
pub mod upstream;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use config::{AllowedOrigin, RelayConfig};
pub use error::RelayError;
pub use openapi::openapi;
pub use upstream::AuthClient;

const REQUEST_ID: &str = "x-request-id";

/// Build the full application router: documented API routes, the reset page,
/// the hash alias, and the middleware stack.
///
/// # Errors
/// Returns an error if the upstream HTTP client cannot be built.
pub fn app(config: RelayConfig) -> Result<Router> {
    let client = Arc::new(AuthClient::new(&config)?);
    let cors = cors_layer(config.allowed_origin());
    let config = Arc::new(config);

    let (router, _openapi) = openapi::api_router().split_for_parts();
    let app = router
        .route("/", get(handlers::page::root))
        .route(
            "/api/auth/user/reset-confirm-hash",
            post(handlers::reset_confirm::reset_confirm),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(client))
                .layer(Extension(config)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, config: RelayConfig) -> Result<()> {
    info!("Relaying to {}", config.auth_base_url());

    let app = app(config)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry::shutdown_tracer();

    Ok(())
}

// A configured origin is only echoed back to that origin.
fn cors_layer(allowed_origin: &AllowedOrigin) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    match allowed_origin {
        AllowedOrigin::Any => cors.allow_origin(Any),
        AllowedOrigin::Exact(origin) => cors.allow_origin(AllowOrigin::list([origin.clone()])),
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}
