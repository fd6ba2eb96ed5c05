//! # Reset Relay
//!
//! `reset-relay` forwards password-reset requests from a web front-end to an
//! external auth backend (a GoTrue-style REST API) and serves the static page
//! the reset email links to.
//!
//! ## Flow
//!
//! 1. `POST /api/auth/user/reset` asks the backend to email a recovery link.
//! 2. The link lands on `GET /?token_hash=..&type=recovery`; the relay verifies
//!    the hash server-side and redirects to the page with the access token in
//!    the URL fragment.
//! 3. The page posts the new password to `POST /api/auth/user/reset-confirm`,
//!    which updates the user with the token as bearer credential.
//!
//! Nothing is stored locally: token validation, password policy beyond the
//! minimum length, and session handling all belong to the backend.

pub mod cli;
pub mod relay;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
