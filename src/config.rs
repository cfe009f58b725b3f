//! Configuration management for the GTM MCP Server.
//!
//! Everything comes from the environment, optionally overridden on the
//! command line. Relative defaults resolve against the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Tag Manager API v2 base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://tagmanager.googleapis.com/tagmanager/v2";

/// Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const CREDENTIALS_VAR: &str = "GTM_CREDENTIALS_FILE";
const TOKEN_VAR: &str = "GTM_TOKEN_FILE";
const API_BASE_URL_VAR: &str = "GTM_API_BASE_URL";
const TOKEN_ENDPOINT_VAR: &str = "GTM_TOKEN_ENDPOINT";
const TIMEOUT_VAR: &str = "GTM_HTTP_TIMEOUT_SECS";
const DEBUG_VAR: &str = "GTM_MCP_DEBUG";

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client-secret JSON downloaded from Google Cloud Console
    pub credentials_path: PathBuf,

    /// Where the OAuth token is cached between runs
    pub token_path: PathBuf,

    /// Tag Manager API base URL
    pub api_base_url: String,

    /// OAuth2 token endpoint used for code exchange and refresh
    pub token_endpoint: String,

    /// HTTP request timeout in seconds; no timeout when unset
    pub timeout_seconds: Option<u64>,

    /// Enable debug mode for MCP message logging
    pub debug: bool,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_vars(&cwd, |name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(cwd: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials_path = var(CREDENTIALS_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join("credentials.json"));
        let token_path = var(TOKEN_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join("token.json"));
        let api_base_url = var(API_BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let token_endpoint = var(TOKEN_ENDPOINT_VAR)
            .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string());

        let timeout_seconds = match var(TIMEOUT_VAR) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        let debug = var(DEBUG_VAR)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let config = Config {
            credentials_path,
            token_path,
            api_base_url,
            token_endpoint,
            timeout_seconds,
            debug,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(ConfigError::Invalid(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if !(self.token_endpoint.starts_with("https://") || self.token_endpoint.starts_with("http://"))
        {
            return Err(ConfigError::Invalid(format!(
                "token endpoint must start with http:// or https://, got '{}'",
                self.token_endpoint
            )));
        }
        if self.credentials_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("credentials path is empty".into()));
        }
        if self.token_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("token path is empty".into()));
        }
        Ok(())
    }

    /// Get the HTTP timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidVar {
            name: TIMEOUT_VAR,
            value: raw.to_string(),
        }),
    }
}
