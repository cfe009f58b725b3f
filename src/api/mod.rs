//! Typed façade over the Tag Manager API v2.
//!
//! One method per remote operation, grouped by resource in the submodules.
//! Every method first checks that the client has been authenticated
//! ([`ServiceError::NotInitialized`] otherwise) and then turns any remote
//! failure into [`Outcome::Failure`]; nothing is retried.

pub mod accounts;
pub mod built_in_variables;
pub mod containers;
pub mod environments;
pub mod folders;
mod resource;
pub mod server_side;
pub mod tags;
pub mod templates;
pub mod triggers;
pub mod user_permissions;
pub mod variables;
pub mod versions;
pub mod workspaces;

#[cfg(test)]
pub(crate) mod mock;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth;
use crate::config::Config;
use crate::debug::DebugLogger;
use crate::error::{ApiError, ServiceError};
use crate::rest::{ApiRequest, RestClient, TagManagerApi};

pub(crate) use resource::{Resource, Scope};

/// Name given to the workspace created when a container has none.
pub const DEFAULT_WORKSPACE_NAME: &str = "Default Workspace";

enum Session {
    Uninitialized,
    Ready(Arc<dyn TagManagerApi>),
}

/// Tag Manager façade. Starts uninitialized; [`GtmClient::authenticate`]
/// installs the REST transport.
pub struct GtmClient {
    config: Config,
    debug: Arc<DebugLogger>,
    session: RwLock<Session>,
}

impl GtmClient {
    pub fn new(config: Config, debug: Arc<DebugLogger>) -> Self {
        Self {
            config,
            debug,
            session: RwLock::new(Session::Uninitialized),
        }
    }

    /// Install a transport directly, skipping OAuth.
    #[cfg(test)]
    pub(crate) fn with_api(self, api: Arc<dyn TagManagerApi>) -> Self {
        Self {
            session: RwLock::new(Session::Ready(api)),
            ..self
        }
    }

    /// Load or obtain OAuth credentials and build the REST transport.
    pub async fn authenticate(&self) -> Result<(), ApiError> {
        let oauth = auth::authorize(&self.config).await?;
        let rest = RestClient::new(&self.config, oauth, self.debug.clone())?;
        *self.session.write().await = Session::Ready(Arc::new(rest));
        debug!("Tag Manager client authenticated");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.session.read().await, Session::Ready(_))
    }

    /// The active transport, or `NotInitialized` before authentication.
    pub(crate) async fn api(&self) -> Result<Arc<dyn TagManagerApi>, ServiceError> {
        match &*self.session.read().await {
            Session::Ready(api) => Ok(api.clone()),
            Session::Uninitialized => Err(ServiceError::NotInitialized),
        }
    }
}

impl std::fmt::Debug for GtmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GtmClient")
            .field("api_base_url", &self.config.api_base_url)
            .finish()
    }
}

/// Result of one façade operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `{"success": true, ...fields}`
    Success(Map<String, Value>),
    /// `{"success": false, "error": message}`
    Failure(String),
}

impl Outcome {
    /// Success without payload.
    pub fn done() -> Self {
        Outcome::Success(Map::new())
    }

    /// Success carrying one entity under `key`. A null payload is left out.
    pub fn entity(key: &str, value: Value) -> Self {
        Outcome::done().with(key, value)
    }

    /// Add another field to a success; no-op on failures and null values.
    pub fn with(self, key: &str, value: Value) -> Self {
        match self {
            Outcome::Success(mut fields) => {
                if !value.is_null() {
                    fields.insert(key.to_string(), value);
                }
                Outcome::Success(fields)
            }
            failure => failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Outcome::Success(fields) => {
                let mut out = fields.clone();
                out.insert("success".to_string(), Value::Bool(true));
                Value::Object(out)
            }
            Outcome::Failure(message) => json!({ "success": false, "error": message }),
        }
    }
}

impl From<Result<Outcome, ApiError>> for Outcome {
    fn from(result: Result<Outcome, ApiError>) -> Self {
        result.unwrap_or_else(|e| Outcome::Failure(e.to_string()))
    }
}

/// Run one remote operation, folding any API error into a failure outcome.
pub(crate) async fn settle<F>(operation: F) -> Outcome
where
    F: Future<Output = Result<Outcome, ApiError>>,
{
    Outcome::from(operation.await)
}

pub(crate) fn account_path(account_id: &str) -> String {
    format!("accounts/{}", account_id)
}

pub(crate) fn container_path(account_id: &str, container_id: &str) -> String {
    format!("accounts/{}/containers/{}", account_id, container_id)
}

/// Resolve the workspace path for an operation. An explicit, non-empty id is
/// used as given; otherwise the container's first workspace is taken, and
/// one named [`DEFAULT_WORKSPACE_NAME`] is created if there is none.
///
/// Resolution is repeated on every call.
pub(crate) async fn workspace_path(
    api: &dyn TagManagerApi,
    account_id: &str,
    container_id: &str,
    workspace_id: Option<&str>,
) -> Result<String, ApiError> {
    let container = container_path(account_id, container_id);
    let id = match workspace_id.filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => default_workspace_id(api, &container)
            .await
            .map_err(|e| ApiError::Workspace(e.to_string()))?,
    };
    Ok(format!("{}/workspaces/{}", container, id))
}

async fn default_workspace_id(api: &dyn TagManagerApi, container: &str) -> Result<String, ApiError> {
    let collection = format!("{}/workspaces", container);
    let listed = api.execute(ApiRequest::get(&collection)).await?;
    if let Some(first) = listed
        .get("workspace")
        .and_then(Value::as_array)
        .and_then(|workspaces| workspaces.first())
    {
        return string_field(first, "workspaceId");
    }

    debug!("No workspace in {}, creating one", container);
    let created = api
        .execute(ApiRequest::post(&collection).body(json!({ "name": DEFAULT_WORKSPACE_NAME })))
        .await?;
    string_field(&created, "workspaceId")
}

pub(crate) fn string_field(value: &Value, field: &'static str) -> Result<String, ApiError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingField(field))
}

/// List a collection, following `nextPageToken` until exhausted. A page
/// without `field` contributes nothing.
pub(crate) async fn list_all(api: &dyn TagManagerApi, path: &str, field: &str) -> Result<Value, ApiError> {
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut seen = HashSet::new();

    loop {
        let mut request = ApiRequest::get(path);
        if let Some(token) = &page_token {
            request = request.query("pageToken", token.clone());
        }
        let page = api.execute(request).await?;

        if let Some(batch) = page.get(field).and_then(Value::as_array) {
            items.extend(batch.iter().cloned());
        }

        match page.get("nextPageToken").and_then(Value::as_str) {
            Some(next) if !next.is_empty() && seen.insert(next.to_string()) => {
                page_token = Some(next.to_string());
            }
            _ => break,
        }
    }

    Ok(Value::Array(items))
}

/// Field changes applied onto a freshly read entity.
#[derive(Debug, Default)]
pub(crate) struct Patch {
    changes: Vec<(&'static str, Option<Value>)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.changes.push((key, Some(value.into())));
        self
    }

    pub fn set_opt<T: Into<Value>>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn remove(mut self, key: &'static str) -> Self {
        self.changes.push((key, None));
        self
    }

    fn apply(self, target: &mut Map<String, Value>) {
        for (key, change) in self.changes {
            match change {
                Some(value) => {
                    target.insert(key.to_string(), value);
                }
                None => {
                    target.remove(key);
                }
            }
        }
    }
}

/// Fingerprint-preserving update: GET the entity, overlay `patch`, PUT the
/// merged body back. Fields the patch does not mention, `fingerprint`
/// included, are sent exactly as read.
pub(crate) async fn read_merge_write(api: &dyn TagManagerApi, path: &str, patch: Patch) -> Result<Value, ApiError> {
    let current = api.execute(ApiRequest::get(path)).await?;
    let Value::Object(mut body) = current else {
        return Err(ApiError::UnexpectedResponse(format!(
            "expected an object when reading {}",
            path
        )));
    };
    patch.apply(&mut body);
    api.execute(ApiRequest::put(path).body(Value::Object(body))).await
}

/// Tag parameters as GTM `template` parameters; non-string values are
/// rendered as JSON text.
pub(crate) fn template_parameters(params: &Map<String, Value>) -> Value {
    Value::Array(
        params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                json!({ "key": key, "value": value, "type": "template" })
            })
            .collect(),
    )
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::api::mock::MockApi;
    use reqwest::Method;

    const CONTAINER: &str = "accounts/1/containers/2";

    #[test]
    fn test_outcome_json_shapes() {
        let ok = Outcome::entity("tag", json!({"tagId": "5"})).to_json();
        assert_eq!(ok, json!({"success": true, "tag": {"tagId": "5"}}));

        let empty = Outcome::entity("snippet", Value::Null).to_json();
        assert_eq!(empty, json!({"success": true}));

        let failed = Outcome::Failure("Not found".into()).to_json();
        assert_eq!(failed, json!({"success": false, "error": "Not found"}));
    }

    #[test]
    fn test_outcome_from_api_error() {
        let outcome = Outcome::from(Err(ApiError::MissingField("path")));
        assert_eq!(
            outcome,
            Outcome::Failure("Response is missing field: path".into())
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_client_reports_not_initialized() {
        let client = unauthenticated_client();
        assert!(!client.is_authenticated().await);
        assert_eq!(client.api().await.err(), Some(ServiceError::NotInitialized));
    }

    #[tokio::test]
    async fn test_explicit_workspace_skips_resolution() {
        let mock = MockApi::new();
        let path = workspace_path(mock.as_ref(), "1", "2", Some("9")).await.unwrap();
        assert_eq!(path, "accounts/1/containers/2/workspaces/9");
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_workspace_id_means_default() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({"workspace": [{"workspaceId": "4"}, {"workspaceId": "8"}]}));

        let path = workspace_path(mock.as_ref(), "1", "2", Some("")).await.unwrap();
        assert_eq!(path, "accounts/1/containers/2/workspaces/4");
    }

    #[tokio::test]
    async fn test_default_workspace_created_when_none_exist() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({}));
        mock.respond(Method::POST, &format!("{CONTAINER}/workspaces"), json!({"workspaceId": "11", "name": "Default Workspace"}));

        let path = workspace_path(mock.as_ref(), "1", "2", None).await.unwrap();
        assert_eq!(path, "accounts/1/containers/2/workspaces/11");

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body, Some(json!({"name": "Default Workspace"})));
    }

    #[tokio::test]
    async fn test_workspace_resolution_is_not_cached() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({"workspace": [{"workspaceId": "1"}]}));
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({"workspace": [{"workspaceId": "2"}]}));

        let first = workspace_path(mock.as_ref(), "1", "2", None).await.unwrap();
        let second = workspace_path(mock.as_ref(), "1", "2", None).await.unwrap();
        assert!(first.ends_with("/workspaces/1"));
        assert!(second.ends_with("/workspaces/2"));
    }

    #[tokio::test]
    async fn test_workspace_resolution_failure_is_prefixed() {
        let mock = MockApi::new();
        mock.fail(Method::GET, &format!("{CONTAINER}/workspaces"), "The caller does not have permission");

        let err = workspace_path(mock.as_ref(), "1", "2", None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to get workspace: The caller does not have permission"
        );
    }

    #[tokio::test]
    async fn test_list_all_follows_page_tokens() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts", json!({"account": [{"accountId": "1"}], "nextPageToken": "p2"}));
        mock.respond(Method::GET, "accounts", json!({"account": [{"accountId": "2"}]}));

        let all = list_all(mock.as_ref(), "accounts", "account").await.unwrap();
        assert_eq!(all, json!([{"accountId": "1"}, {"accountId": "2"}]));

        let requests = mock.requests();
        assert!(requests[0].query.is_empty());
        assert_eq!(requests[1].query, vec![("pageToken".to_string(), "p2".to_string())]);
    }

    #[tokio::test]
    async fn test_list_all_stops_when_page_tokens_cycle() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts", json!({"account": [{"accountId": "1"}], "nextPageToken": "p1"}));
        mock.respond(Method::GET, "accounts", json!({"account": [{"accountId": "2"}], "nextPageToken": "p2"}));
        mock.respond(Method::GET, "accounts", json!({"account": [{"accountId": "3"}], "nextPageToken": "p1"}));

        let all = list_all(mock.as_ref(), "accounts", "account").await.unwrap();
        assert_eq!(all, json!([{"accountId": "1"}, {"accountId": "2"}, {"accountId": "3"}]));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_list_all_missing_field_is_empty() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts", json!({}));
        assert_eq!(list_all(mock.as_ref(), "accounts", "account").await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_read_merge_write_preserves_unmentioned_fields() {
        let mock = MockApi::new();
        let path = "accounts/1";
        mock.respond(Method::GET, path, json!({"accountId": "1", "name": "Old", "shareData": true, "fingerprint": "fp-1"}));
        mock.respond(Method::PUT, path, json!({"accountId": "1", "name": "New"}));

        let patch = Patch::new().set("name", "New").remove("shareData");
        read_merge_write(mock.as_ref(), path, patch).await.unwrap();

        let put = &mock.requests()[1];
        assert_eq!(put.method, Method::PUT);
        assert_eq!(
            put.body,
            Some(json!({"accountId": "1", "name": "New", "fingerprint": "fp-1"}))
        );
    }

    #[tokio::test]
    async fn test_read_merge_write_stops_when_read_fails() {
        let mock = MockApi::new();
        mock.fail(Method::GET, "accounts/1", "Not found");

        let err = read_merge_write(mock.as_ref(), "accounts/1", Patch::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_template_parameters_stringify_values_in_caller_order() {
        let params: Map<String, Value> =
            serde_json::from_str(r#"{"threshold": 90, "enabled": true, "tagId": "G-1"}"#).unwrap();

        let rendered = template_parameters(&params);
        assert_eq!(
            rendered,
            json!([
                {"key": "threshold", "value": "90", "type": "template"},
                {"key": "enabled", "value": "true", "type": "template"},
                {"key": "tagId", "value": "G-1", "type": "template"},
            ])
        );
    }

    #[tokio::test]
    async fn test_client_with_installed_api_is_authenticated() {
        let mock = MockApi::new();
        let client = client_with(&mock);
        assert!(client.is_authenticated().await);
    }
}
