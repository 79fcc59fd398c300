//! Configuration parsing

use clap::{Args, Parser};
use serde::{Deserialize, Serialize};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Settings the auth routes and the identity-provider client are built from.
///
/// Field names follow the camelCase keys embedding applications already use
/// (`issuerBaseUrl`, `unAuthorisedUrl`, ...) when deserialized.
#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    /// Kinde domain, e.g. https://example.kinde.com
    #[arg(long = "issuer-url", env = "KINDE_ISSUER_URL")]
    #[serde(default)]
    pub issuer_base_url: String,

    /// Callback URL registered with Kinde (points at /kinde_callback)
    #[arg(long, env = "KINDE_REDIRECT_URL")]
    #[serde(default)]
    pub redirect_url: String,

    /// Where users land after a successful login
    #[arg(long, env = "KINDE_SITE_URL")]
    #[serde(default)]
    pub site_url: String,

    /// OAuth client secret
    #[arg(long, env = "KINDE_CLIENT_SECRET", hide_env_values = true)]
    #[serde(default)]
    pub secret: String,

    /// Where users land when the callback cannot be completed
    #[arg(long = "unauthorised-url", env = "KINDE_UNAUTHORISED_URL")]
    #[serde(default, rename = "unAuthorisedUrl")]
    pub unauthorised_url: String,

    /// OAuth client ID
    #[arg(long, env = "KINDE_CLIENT_ID")]
    #[serde(default)]
    pub client_id: String,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kinde-auth-router",
    version,
    about = "Register, login and callback routes backed by Kinde",
    long_about = "Serves /register, /login and /kinde_callback, delegating authentication to the Kinde identity provider"
)]
pub struct ServerConfig {
    #[command(flatten)]
    pub setup: SetupConfig,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Don't show the startup banner
    #[arg(long)]
    pub no_banner: bool,

    /// Show only error messages
    #[arg(long, conflicts_with = "debug")]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long, env = "KINDE_ROUTER_DEBUG")]
    pub debug: bool,
}

impl ServerConfig {
    /// Parse configuration from CLI arguments and environment variables
    pub fn parse_args() -> Self {
        ServerConfig::parse()
    }

    /// Get log level based on flags
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 13] = [
        "kinde-auth-router",
        "--issuer-url",
        "https://x",
        "--redirect-url",
        "https://y/cb",
        "--site-url",
        "https://z",
        "--secret",
        "s",
        "--unauthorised-url",
        "https://z/unauth",
        "--client-id",
        "c",
    ];

    #[test]
    fn test_parse_flags() {
        let config = ServerConfig::try_parse_from(REQUIRED).unwrap();

        assert_eq!(config.setup.issuer_base_url, "https://x");
        assert_eq!(config.setup.unauthorised_url, "https://z/unauth");
        assert_eq!(config.listen, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_flags() {
        let mut args = REQUIRED.to_vec();
        args.push("--debug");
        let config = ServerConfig::try_parse_from(args).unwrap();
        assert_eq!(config.log_level(), tracing::Level::DEBUG);

        let mut args = REQUIRED.to_vec();
        args.push("--silent");
        let config = ServerConfig::try_parse_from(args).unwrap();
        assert_eq!(config.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: SetupConfig = serde_json::from_str(
            r#"{
                "issuerBaseUrl": "https://x",
                "redirectUrl": "https://y/cb",
                "siteUrl": "https://z",
                "secret": "s",
                "unAuthorisedUrl": "https://z/unauth",
                "clientId": "c"
            }"#,
        )
        .unwrap();

        assert_eq!(config.redirect_url, "https://y/cb");
        assert_eq!(config.unauthorised_url, "https://z/unauth");
        assert_eq!(config.client_id, "c");
    }

    #[test]
    fn test_deserialize_missing_fields_default_to_empty() {
        let config: SetupConfig = serde_json::from_str(r#"{"siteUrl": "https://z"}"#).unwrap();
        assert!(config.issuer_base_url.is_empty());
        assert_eq!(config.site_url, "https://z");
    }
}
