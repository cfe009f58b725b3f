//! REST transport for the Tag Manager API v2.
//!
//! Façade code never touches `reqwest` directly; it builds an [`ApiRequest`]
//! and hands it to a [`TagManagerApi`]. The production implementation is
//! [`RestClient`]; tests substitute a recording mock.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::auth::OAuthSession;
use crate::config::Config;
use crate::debug::DebugLogger;
use crate::error::ApiError;

#[cfg(test)]
pub(crate) mod stub;

/// One call against the API, addressed by resource path relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path plus encoded query string, relative to the base URL.
    pub fn relative_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Anything able to execute Tag Manager API calls.
#[async_trait]
pub trait TagManagerApi: Send + Sync {
    /// Execute a request and return the decoded JSON body.
    /// Empty bodies come back as `Value::Null`.
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Tag Manager API client over HTTPS.
pub struct RestClient {
    base_url: String,
    http_client: Client,
    session: OAuthSession,
    debug: Arc<DebugLogger>,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// # Errors
    /// Returns `ApiError::HttpClientInit` if the HTTP client cannot be created.
    pub fn new(config: &Config, session: OAuthSession, debug: Arc<DebugLogger>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::HttpClientInit(e.to_string()))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            http_client,
            session,
            debug,
        })
    }
}

#[async_trait]
impl TagManagerApi for RestClient {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, request.relative_url());
        let token = self.session.access_token().await?;

        self.debug.log_api_request(request.method.as_str(), &url);

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .bearer_auth(token)
            .header("Accept", "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = google_error_message(&text).unwrap_or_else(|| {
                if text.trim().is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    text.clone()
                }
            });
            self.debug.log_error(&url, &message);
            return Err(ApiError::Google { status, message });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        self.debug.log_api_response(status.as_u16(), &body);
        Ok(body)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Extract `error.message` from a Google API error envelope.
fn google_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::stub::StubServer;
    use super::*;
    use crate::auth::{authorize_with, ConsentMode, StoredToken};
    use crate::config::DEFAULT_TOKEN_ENDPOINT;
    use reqwest::StatusCode;
    use serde_json::json;
    use tempfile::TempDir;

    /// A client pointed at `base_url`, holding an unexpired access token.
    async fn rest_client(dir: &TempDir, base_url: &str) -> RestClient {
        let credentials_path = dir.path().join("credentials.json");
        std::fs::write(
            &credentials_path,
            r#"{"installed":{"client_id":"cid","client_secret":"shh"}}"#,
        )
        .unwrap();

        let config = Config {
            credentials_path,
            token_path: dir.path().join("token.json"),
            api_base_url: base_url.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            timeout_seconds: Some(5),
            debug: false,
        };
        StoredToken {
            access_token: Some("ya29.valid".into()),
            expiry_date: Some(chrono::Utc::now().timestamp_millis() + 3_600_000),
            ..Default::default()
        }
        .save(&config.token_path)
        .unwrap();

        let session = authorize_with(&config, ConsentMode::Unattended).await.unwrap();
        RestClient::new(&config, session, Arc::new(DebugLogger::disabled())).unwrap()
    }

    #[tokio::test]
    async fn test_execute_decodes_body_and_sends_bearer_token() {
        let dir = TempDir::new().unwrap();
        let stub = StubServer::start(vec![(200, r#"{"accountId":"1","name":"Acme"}"#)]).await;
        let client = rest_client(&dir, &stub.url).await;

        let body = client
            .execute(ApiRequest::put("accounts/1").body(json!({"name": "Acme"})))
            .await
            .unwrap();
        assert_eq!(body, json!({"accountId": "1", "name": "Acme"}));

        let requests = stub.requests().await;
        assert!(requests[0].starts_with("PUT /accounts/1 HTTP/1.1"), "{}", requests[0]);
        assert!(requests[0]
            .to_ascii_lowercase()
            .contains("authorization: bearer ya29.valid"));
        assert!(requests[0].ends_with(r#"{"name":"Acme"}"#));
    }

    #[tokio::test]
    async fn test_execute_empty_body_is_null() {
        let dir = TempDir::new().unwrap();
        let stub = StubServer::start(vec![(204, ""), (200, "")]).await;
        let client = rest_client(&dir, &stub.url).await;

        let deleted = client.execute(ApiRequest::delete("accounts/1/containers/2")).await;
        assert_eq!(deleted.unwrap(), Value::Null);
        let empty = client.execute(ApiRequest::get("accounts/1/containers/2/snippet")).await;
        assert_eq!(empty.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_execute_maps_google_error_envelope() {
        let dir = TempDir::new().unwrap();
        let stub = StubServer::start(vec![(
            404,
            r#"{"error":{"code":404,"message":"Not found or permission denied.","status":"NOT_FOUND"}}"#,
        )])
        .await;
        let client = rest_client(&dir, &stub.url).await;

        let err = client.execute(ApiRequest::get("accounts/9")).await.unwrap_err();
        match err {
            ApiError::Google { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Not found or permission denied.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_without_envelope_reports_raw_body() {
        let dir = TempDir::new().unwrap();
        let stub = StubServer::start(vec![(502, "<html>Bad Gateway</html>"), (500, "")]).await;
        let client = rest_client(&dir, &stub.url).await;

        let err = client.execute(ApiRequest::get("accounts")).await.unwrap_err();
        assert_eq!(err.to_string(), "<html>Bad Gateway</html>");

        let err = client.execute(ApiRequest::get("accounts")).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500 Internal Server Error");
    }

    #[test]
    fn test_relative_url_without_query() {
        let request = ApiRequest::get("accounts/1/containers");
        assert_eq!(request.relative_url(), "accounts/1/containers");
    }

    #[test]
    fn test_relative_url_encodes_query() {
        let request = ApiRequest::get("accounts/containers:lookup")
            .query("tagId", "GTM-AB12")
            .query("pageToken", "a b/c");
        assert_eq!(
            request.relative_url(),
            "accounts/containers:lookup?tagId=GTM-AB12&pageToken=a%20b%2Fc"
        );
    }

    #[test]
    fn test_builders_set_method_and_body() {
        let request = ApiRequest::put("accounts/1").body(json!({"name": "n"}));
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.body, Some(json!({"name": "n"})));
        assert_eq!(ApiRequest::delete("x").method, Method::DELETE);
    }

    #[test]
    fn test_google_error_message_extraction() {
        let body = r#"{"error":{"code":404,"message":"Not found or permission denied.","status":"NOT_FOUND"}}"#;
        assert_eq!(
            google_error_message(body).as_deref(),
            Some("Not found or permission denied.")
        );
        assert_eq!(
            google_error_message(r#"{"error":"invalid_grant"}"#).as_deref(),
            Some("invalid_grant")
        );
        assert!(google_error_message("<html>502</html>").is_none());
    }
}
