//! Unified error types for the GTM MCP Server.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "Credentials file not found: {}. Please download OAuth 2.0 credentials from Google Cloud Console.",
        .0.display()
    )]
    CredentialsNotFound(PathBuf),

    #[error("Invalid credentials file: {0}")]
    InvalidCredentials(String),

    #[error("Authentication required. Please run \"gtm-mcp auth\" to authenticate first.")]
    AuthenticationRequired,

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Token request failed with status {status}: {body}")]
    TokenRequestFailed { status: StatusCode, body: String },

    #[error("Token parse error: {0}")]
    TokenParse(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create HTTP client: {0}")]
    HttpClientInit(String),
}

/// Errors raised while talking to the Tag Manager API.
///
/// These never cross the façade boundary; each one is turned into a
/// `{"success": false, "error": ...}` result there.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// A non-2xx answer. `message` is Google's own error message when the
    /// body carried one.
    #[error("{message}")]
    Google { status: StatusCode, message: String },

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Response is missing field: {0}")]
    MissingField(&'static str),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to get workspace: {0}")]
    Workspace(String),

    #[error("Failed to create HTTP client: {0}")]
    HttpClientInit(String),
}

/// Caller-side contract violations of the façade.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Service not initialized. Call authenticate() first.")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_invalid_var_display() {
        let error = ConfigError::InvalidVar {
            name: "GTM_HTTP_TIMEOUT_SECS",
            value: "soon".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for GTM_HTTP_TIMEOUT_SECS: soon"
        );
    }

    #[test]
    fn test_auth_error_credentials_not_found_display() {
        let error = AuthError::CredentialsNotFound(PathBuf::from("/tmp/credentials.json"));
        assert_eq!(
            error.to_string(),
            "Credentials file not found: /tmp/credentials.json. \
             Please download OAuth 2.0 credentials from Google Cloud Console."
        );
    }

    #[test]
    fn test_auth_error_authentication_required_display() {
        let display = AuthError::AuthenticationRequired.to_string();
        assert!(display.starts_with("Authentication required."));
        assert!(display.contains("gtm-mcp auth"));
    }

    #[test]
    fn test_auth_error_token_request_failed_display() {
        let error = AuthError::TokenRequestFailed {
            status: StatusCode::BAD_REQUEST,
            body: "invalid_grant".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("400"));
        assert!(display.contains("invalid_grant"));
    }

    #[test]
    fn test_api_error_google_passes_message_through() {
        let error = ApiError::Google {
            status: StatusCode::NOT_FOUND,
            message: "Not found or permission denied.".to_string(),
        };
        assert_eq!(error.to_string(), "Not found or permission denied.");
    }

    #[test]
    fn test_api_error_workspace_display() {
        let error = ApiError::Workspace("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Failed to get workspace: quota exceeded");
    }

    #[test]
    fn test_api_error_from_auth_error() {
        let error: ApiError = AuthError::NoRefreshToken.into();
        assert_eq!(error.to_string(), "No refresh token available");
    }

    #[test]
    fn test_service_error_display() {
        assert_eq!(
            ServiceError::NotInitialized.to_string(),
            "Service not initialized. Call authenticate() first."
        );
    }
}
