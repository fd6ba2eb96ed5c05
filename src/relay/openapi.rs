use super::handlers::{health, reset, reset_confirm, user};
use utoipa::openapi::{tag::TagBuilder, InfoBuilder, License, OpenApi, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

const RESET_TAG: &str = "reset";
const HEALTH_TAG: &str = "health";

#[must_use]
pub fn openapi() -> OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router for the documented JSON endpoints.
///
/// The page at `/` and the hash alias are mounted in `app()` and stay out of
/// the document.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(base_document())
        .routes(routes!(health::health))
        .routes(routes!(reset::reset))
        .routes(routes!(reset_confirm::reset_confirm))
        .routes(routes!(user::get_user))
}

fn base_document() -> OpenApi {
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .license(Some(License::new(env!("CARGO_PKG_LICENSE"))))
        .build();

    OpenApiBuilder::new()
        .info(info)
        .tags(Some([
            tag(RESET_TAG, "Password recovery relayed to the auth backend"),
            tag(HEALTH_TAG, "Liveness"),
        ]))
        .build()
}

fn tag(name: &str, description: &str) -> Tag {
    TagBuilder::new()
        .name(name)
        .description(Some(description))
        .build()
}
