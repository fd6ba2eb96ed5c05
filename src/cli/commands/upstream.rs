use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_API_KEY: &str = "api-key";
pub const ARG_REDIRECT_URL: &str = "redirect-url";

// Variable names used by earlier deployments of the relay.
pub const LEGACY_AUTH_URL_ENV: &str = "SUPABASE_URL";
pub const LEGACY_API_KEY_ENV: &str = "SUPABASE_ANON_KEY";

pub const DEFAULT_REDIRECT_URL: &str = "https://reset-production.up.railway.app";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Auth backend base URL, example: https://xxxxx.supabase.co")
                .long_help(
                    "Auth backend base URL, example: https://xxxxx.supabase.co. Falls back to SUPABASE_URL when unset.",
                )
                .env("RESET_RELAY_AUTH_URL"),
        )
        .arg(
            Arg::new(ARG_API_KEY)
                .long(ARG_API_KEY)
                .help("Auth backend API key sent in the `apikey` header")
                .long_help(
                    "Auth backend API key sent in the `apikey` header. Falls back to SUPABASE_ANON_KEY when unset.",
                )
                .env("RESET_RELAY_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_REDIRECT_URL)
                .long(ARG_REDIRECT_URL)
                .help("URL the recovery email links back to")
                .env("RESET_RELAY_REDIRECT_URL")
                .default_value(DEFAULT_REDIRECT_URL),
        )
}

#[derive(Debug)]
pub struct Options {
    pub auth_url: String,
    pub api_key: String,
    pub redirect_url: String,
}

impl Options {
    /// Read the upstream options, falling back to the legacy environment variables.
    ///
    /// # Errors
    /// Returns an error if the auth URL or API key is not provided anywhere.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let auth_url = arg_or_env(matches, ARG_AUTH_URL, LEGACY_AUTH_URL_ENV)
            .context("missing required argument: --auth-url")?;
        let api_key = arg_or_env(matches, ARG_API_KEY, LEGACY_API_KEY_ENV)
            .context("missing required argument: --api-key")?;
        let redirect_url = matches
            .get_one::<String>(ARG_REDIRECT_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string());

        Ok(Self {
            auth_url,
            api_key,
            redirect_url,
        })
    }
}

fn arg_or_env(matches: &ArgMatches, id: &str, legacy_env: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .or_else(|| std::env::var(legacy_env).ok())
        .filter(|value| !value.trim().is_empty())
}
