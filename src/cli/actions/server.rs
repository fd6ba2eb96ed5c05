use crate::relay::{self, RelayConfig};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

pub struct Args {
    pub port: u16,
    pub auth_url: String,
    pub api_key: String,
    pub redirect_url: String,
    pub allowed_origin: String,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("auth_url", &self.auth_url)
            .field("api_key", &"***")
            .field("redirect_url", &self.redirect_url)
            .field("allowed_origin", &self.allowed_origin)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("server args: {:?}", args);

    let config = RelayConfig::new(
        &args.auth_url,
        SecretString::from(args.api_key),
        &args.redirect_url,
        &args.allowed_origin,
    )?;

    relay::new(args.port, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_api_key() {
        let args = Args {
            port: 5000,
            auth_url: "https://auth.tld".to_string(),
            api_key: "super-secret".to_string(),
            redirect_url: "https://reset.tld".to_string(),
            allowed_origin: "*".to_string(),
        };

        let printed = format!("{args:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("https://auth.tld"));
    }
}
