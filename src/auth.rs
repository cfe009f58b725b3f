//! OAuth2 installed-app authentication for the Tag Manager API.
//!
//! The client-secret file is the JSON downloaded from Google Cloud Console.
//! The token file uses the same layout Google's Node client writes
//! (`expiry_date` in epoch milliseconds), so existing tokens keep working.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AuthError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Scopes requested during consent.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/tagmanager.edit.containers",
    "https://www.googleapis.com/auth/tagmanager.publish",
    "https://www.googleapis.com/auth/tagmanager.readonly",
    "https://www.googleapis.com/auth/tagmanager.manage.accounts",
    "https://www.googleapis.com/auth/tagmanager.manage.users",
    "https://www.googleapis.com/auth/tagmanager.delete.containers",
];

/// Refresh this long before the recorded expiry.
const EXPIRY_BUFFER_MS: i64 = 30_000;

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

/// OAuth client registration from Google Cloud Console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecrets {
    /// Load the `installed` (or `web`) section of a client-secret file.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::CredentialsNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let file: ClientSecretsFile = serde_json::from_str(&content)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidCredentials("expected an \"installed\" or \"web\" section".into())
        })
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or("http://localhost")
    }

    /// Consent page URL requesting offline access.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?access_type=offline&prompt=consent&response_type=code&client_id={}&redirect_uri={}&scope={}",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(self.redirect_uri()),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }
}

/// Persisted OAuth credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Expiry in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredToken {
    /// Read a token file. A missing or unreadable file yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Failed to load existing token from {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AuthError::TokenParse(e.to_string()))?;
        std::fs::write(path, json)?;
        info!("Token stored to {}", path.display());
        Ok(())
    }

    /// True once `now_ms + buffer_ms` reaches the recorded expiry.
    /// Tokens without an expiry never count as expired.
    pub fn is_expired(&self, now_ms: i64, buffer_ms: i64) -> bool {
        self.expiry_date
            .map(|expiry| expiry <= now_ms + buffer_ms)
            .unwrap_or(false)
    }

    fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Apply a token-endpoint answer, keeping the old refresh token when the
    /// answer does not carry a new one.
    fn absorb(self, response: TokenResponse, now_ms: i64) -> Self {
        StoredToken {
            access_token: Some(response.access_token),
            refresh_token: response.refresh_token.or(self.refresh_token),
            scope: response.scope.or(self.scope),
            token_type: response.token_type.or(self.token_type),
            id_token: response.id_token.or(self.id_token),
            expiry_date: response
                .expires_in
                .map(|secs| now_ms + secs * 1000)
                .or(self.expiry_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    id_token: Option<String>,
}

/// Whether the consent flow may prompt on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentMode {
    Interactive,
    Unattended,
}

impl ConsentMode {
    /// Interactive only when both stdin and stdout are terminals.
    pub fn detect() -> Self {
        if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
            ConsentMode::Interactive
        } else {
            ConsentMode::Unattended
        }
    }
}

/// The OAuth2 token endpoint plus the HTTP client used to reach it.
#[derive(Debug, Clone)]
struct TokenEndpoint {
    url: String,
    http_client: Client,
}

impl TokenEndpoint {
    fn new(config: &Config) -> Result<Self, AuthError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| AuthError::HttpClientInit(e.to_string()))?;

        Ok(Self {
            url: config.token_endpoint.clone(),
            http_client,
        })
    }

    async fn exchange_code(&self, secrets: &ClientSecrets, code: &str) -> Result<TokenResponse, AuthError> {
        let body = form_body(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &secrets.client_id),
            ("client_secret", &secrets.client_secret),
            ("redirect_uri", secrets.redirect_uri()),
        ]);
        self.request(body).await
    }

    async fn refresh(&self, secrets: &ClientSecrets, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let body = form_body(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &secrets.client_id),
            ("client_secret", &secrets.client_secret),
        ]);
        self.request(body).await
    }

    async fn request(&self, body: String) -> Result<TokenResponse, AuthError> {
        debug!("Requesting token from {}", self.url);

        let response = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequestFailed { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::TokenParse(format!("Failed to parse token response: {}", e)))
    }
}

/// A live credential able to hand out bearer tokens.
#[derive(Clone)]
pub struct OAuthSession {
    secrets: ClientSecrets,
    token_path: PathBuf,
    endpoint: TokenEndpoint,
    token: Arc<RwLock<StoredToken>>,
}

impl OAuthSession {
    fn new(secrets: ClientSecrets, token_path: PathBuf, endpoint: TokenEndpoint, token: StoredToken) -> Self {
        Self {
            secrets,
            token_path,
            endpoint,
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        {
            let token = self.token.read().await;
            if !token.is_expired(now_ms(), EXPIRY_BUFFER_MS) {
                if let Some(access) = token.access_token.as_ref().filter(|t| !t.is_empty()) {
                    return Ok(access.clone());
                }
            }
        }

        self.refresh().await
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        let mut token = self.token.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if token.has_access_token() && !token.is_expired(now_ms(), EXPIRY_BUFFER_MS) {
            return Ok(token.access_token.clone().unwrap_or_default());
        }

        let refresh_token = token.refresh_token.clone().ok_or(AuthError::NoRefreshToken)?;
        let response = self.endpoint.refresh(&self.secrets, &refresh_token).await?;
        *token = token.clone().absorb(response, now_ms());
        persist(&token, &self.token_path);

        debug!("Access token refreshed");
        Ok(token.access_token.clone().unwrap_or_default())
    }
}

impl std::fmt::Debug for OAuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSession")
            .field("client_id", &self.secrets.client_id)
            .field("token_path", &self.token_path)
            .finish()
    }
}

/// Load or obtain a credential, prompting only when a terminal is attached.
pub async fn authorize(config: &Config) -> Result<OAuthSession, AuthError> {
    authorize_with(config, ConsentMode::detect()).await
}

/// Load or obtain a credential.
///
/// A malformed token file counts as no token. An expired token is refreshed
/// silently; if that fails the consent flow runs again.
pub async fn authorize_with(config: &Config, mode: ConsentMode) -> Result<OAuthSession, AuthError> {
    let stored = StoredToken::load(&config.token_path);
    let secrets = ClientSecrets::load(&config.credentials_path)?;
    let endpoint = TokenEndpoint::new(config)?;

    let token = match stored {
        Some(token) if token.has_access_token() => token,
        _ => {
            let token = consent(&endpoint, &secrets, &config.token_path, mode).await?;
            return Ok(OAuthSession::new(secrets, config.token_path.clone(), endpoint, token));
        }
    };

    if !token.is_expired(now_ms(), 0) {
        return Ok(OAuthSession::new(secrets, config.token_path.clone(), endpoint, token));
    }

    let refreshed = match token.refresh_token.as_deref() {
        Some(refresh_token) => endpoint
            .refresh(&secrets, refresh_token)
            .await
            .map(|response| token.clone().absorb(response, now_ms())),
        None => Err(AuthError::NoRefreshToken),
    };

    let token = match refreshed {
        Ok(token) => {
            persist(&token, &config.token_path);
            token
        }
        Err(e) => {
            warn!("Token refresh failed: {}", e);
            consent(&endpoint, &secrets, &config.token_path, mode).await?
        }
    };

    Ok(OAuthSession::new(secrets, config.token_path.clone(), endpoint, token))
}

/// Save a refreshed token. A write failure leaves the in-memory token usable.
fn persist(token: &StoredToken, path: &Path) {
    if let Err(e) = token.save(path) {
        warn!("Failed to store refreshed token to {}: {}", path.display(), e);
    }
}

async fn consent(
    endpoint: &TokenEndpoint,
    secrets: &ClientSecrets,
    token_path: &Path,
    mode: ConsentMode,
) -> Result<StoredToken, AuthError> {
    if mode == ConsentMode::Unattended {
        return Err(AuthError::AuthenticationRequired);
    }

    eprintln!("Authorize this app by visiting this url: {}", secrets.authorize_url());
    eprintln!("Waiting for authorization code...");
    eprint!("Enter the code from that page here: ");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let code = lines
        .next_line()
        .await?
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .ok_or_else(|| AuthError::TokenParse("no authorization code entered".into()))?;

    let response = endpoint.exchange_code(secrets, &code).await?;
    let token = StoredToken::default().absorb(response, now_ms());
    token.save(token_path)?;
    Ok(token)
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
