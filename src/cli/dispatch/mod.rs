//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action, resolving the legacy environment
//! fallbacks (`PORT`, `SUPABASE_URL`, `SUPABASE_ANON_KEY`) along the way.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{upstream, ARG_ALLOWED_ORIGIN, ARG_PORT};
use anyhow::{Context, Result};
use clap::parser::ValueSource;

pub const LEGACY_PORT_ENV: &str = "PORT";

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = resolve_port(matches)?;
    let upstream = upstream::Options::parse(matches)?;
    let allowed_origin = matches
        .get_one::<String>(ARG_ALLOWED_ORIGIN)
        .cloned()
        .unwrap_or_else(|| "*".to_string());

    Ok(Action::Server(Args {
        port,
        auth_url: upstream.auth_url,
        api_key: upstream.api_key,
        redirect_url: upstream.redirect_url,
        allowed_origin,
    }))
}

// Hosting platforms inject PORT; it only wins over the built-in default.
fn resolve_port(matches: &clap::ArgMatches) -> Result<u16> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(5000);

    if matches.value_source(ARG_PORT) == Some(ValueSource::DefaultValue) {
        if let Ok(value) = std::env::var(LEGACY_PORT_ENV) {
            return value
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid {LEGACY_PORT_ENV} value: {value}"));
        }
    }

    Ok(port)
}
