//! Workspace operations, including status, sync, conflicts and previews.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{container_path, list_all, read_merge_write, settle, workspace_path, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

/// How a merge conflict is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictChange {
    Keep,
    Delete,
}

impl ConflictChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictChange::Keep => "KEEP",
            ConflictChange::Delete => "DELETE",
        }
    }
}

/// Entity lists for a bulk update; absent lists are not sent.
#[derive(Debug, Clone, Default)]
pub struct BulkChanges {
    pub tag: Option<Vec<Value>>,
    pub trigger: Option<Vec<Value>>,
    pub variable: Option<Vec<Value>>,
    pub folder: Option<Vec<Value>>,
}

impl BulkChanges {
    fn into_body(self) -> Value {
        let mut body = Map::new();
        for (key, entities) in [
            ("tag", self.tag),
            ("trigger", self.trigger),
            ("variable", self.variable),
            ("folder", self.folder),
        ] {
            if let Some(entities) = entities {
                body.insert(key.to_string(), Value::Array(entities));
            }
        }
        Value::Object(body)
    }
}

fn explicit_workspace(account_id: &str, container_id: &str, workspace_id: &str) -> String {
    format!("{}/workspaces/{}", container_path(account_id, container_id), workspace_id)
}

impl GtmClient {
    pub async fn list_workspaces(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/workspaces", container_path(account_id, container_id));
            let workspaces = list_all(api.as_ref(), &path, "workspace").await?;
            Ok(Outcome::entity("workspaces", workspaces))
        })
        .await)
    }

    pub async fn get_workspace(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = explicit_workspace(account_id, container_id, workspace_id);
            let workspace = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("workspace", workspace))
        })
        .await)
    }

    pub async fn create_workspace(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let mut body = json!({ "name": name });
            if let Some(description) = description.filter(|d| !d.is_empty()) {
                body["description"] = json!(description);
            }
            let path = format!("{}/workspaces", container_path(account_id, container_id));
            let workspace = api.execute(ApiRequest::post(path).body(body)).await?;
            Ok(Outcome::entity("workspace", workspace))
        })
        .await)
    }

    pub async fn update_workspace(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt("name", name)
                .set_opt("description", description);
            let path = explicit_workspace(account_id, container_id, workspace_id);
            let workspace = read_merge_write(api.as_ref(), &path, patch).await?;
            Ok(Outcome::entity("workspace", workspace))
        })
        .await)
    }

    pub async fn delete_workspace(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = explicit_workspace(account_id, container_id, workspace_id);
            api.execute(ApiRequest::delete(path)).await?;
            Ok(Outcome::done())
        })
        .await)
    }

    /// Pending changes and merge conflicts of a workspace.
    pub async fn get_workspace_status(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/status", explicit_workspace(account_id, container_id, workspace_id));
            let status = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("status", status))
        })
        .await)
    }

    /// Bring the workspace up to the latest container version.
    pub async fn sync_workspace(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}:sync", explicit_workspace(account_id, container_id, workspace_id));
            let result = api.execute(ApiRequest::post(path)).await?;
            Ok(Outcome::entity("syncResult", result))
        })
        .await)
    }

    pub async fn resolve_conflict(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
        conflict_id: &str,
        change: ConflictChange,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!(
                "{}:resolve_conflict",
                explicit_workspace(account_id, container_id, workspace_id)
            );
            let body = json!({ "conflictId": conflict_id, "changeType": change.as_str() });
            let conflict = api.execute(ApiRequest::post(path).body(body)).await?;
            Ok(Outcome::entity("conflict", conflict))
        })
        .await)
    }

    pub async fn bulk_update(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: &str,
        changes: BulkChanges,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!(
                "{}/bulk_update",
                explicit_workspace(account_id, container_id, workspace_id)
            );
            let result = api
                .execute(ApiRequest::post(path).body(changes.into_body()))
                .await?;
            Ok(Outcome::entity("result", result))
        })
        .await)
    }

    /// Quick-preview URL for the workspace's current state.
    pub async fn quick_preview(
        &self,
        account_id: &str,
        container_id: &str,
        url: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let response = api
                .execute(ApiRequest::post(format!("{}:quick_preview", ws)).body(json!({ "url": url })))
                .await?;
            let preview_url = response.get("previewUrl").cloned().unwrap_or(Value::Null);
            Ok(Outcome::entity("previewUrl", preview_url))
        })
        .await)
    }
}
