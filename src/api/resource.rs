//! Shared CRUD plumbing for workspace-scoped entities.
//!
//! Tags, triggers, variables, folders, clients, gtag configs, templates,
//! transformations and zones all live under
//! `accounts/{a}/containers/{c}/workspaces/{w}/{collection}` and differ only
//! in collection name, list field and result keys.

use serde_json::Value;

use super::{list_all, read_merge_write, settle, workspace_path, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

/// Where a workspace entity lives and how its results are keyed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resource {
    /// Path segment below the workspace, e.g. `tags`.
    pub collection: &'static str,
    /// Array field of a list response, e.g. `tag`.
    pub list_field: &'static str,
    /// Result key for a single entity.
    pub key: &'static str,
    /// Result key for a list.
    pub plural: &'static str,
}

impl Resource {
    pub fn collection_path(&self, workspace: &str) -> String {
        format!("{}/{}", workspace, self.collection)
    }

    pub fn item_path(&self, workspace: &str, id: &str) -> String {
        format!("{}/{}/{}", workspace, self.collection, id)
    }
}

/// Container and optional workspace an entity operation targets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub account_id: &'a str,
    pub container_id: &'a str,
    pub workspace_id: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn new(account_id: &'a str, container_id: &'a str, workspace_id: Option<&'a str>) -> Self {
        Self {
            account_id,
            container_id,
            workspace_id,
        }
    }
}

impl GtmClient {
    pub(crate) async fn list_entities(&self, resource: Resource, scope: Scope<'_>) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            let items = list_all(api.as_ref(), &resource.collection_path(&ws), resource.list_field).await?;
            Ok(Outcome::entity(resource.plural, items))
        })
        .await)
    }

    pub(crate) async fn get_entity(
        &self,
        resource: Resource,
        scope: Scope<'_>,
        id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            let entity = api.execute(ApiRequest::get(resource.item_path(&ws, id))).await?;
            Ok(Outcome::entity(resource.key, entity))
        })
        .await)
    }

    pub(crate) async fn create_entity(
        &self,
        resource: Resource,
        scope: Scope<'_>,
        body: Value,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            let request = ApiRequest::post(resource.collection_path(&ws)).body(body);
            let created = api.execute(request).await?;
            Ok(Outcome::entity(resource.key, created))
        })
        .await)
    }

    pub(crate) async fn update_entity(
        &self,
        resource: Resource,
        scope: Scope<'_>,
        id: &str,
        patch: Patch,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            let updated = read_merge_write(api.as_ref(), &resource.item_path(&ws, id), patch).await?;
            Ok(Outcome::entity(resource.key, updated))
        })
        .await)
    }

    pub(crate) async fn delete_entity(
        &self,
        resource: Resource,
        scope: Scope<'_>,
        id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            api.execute(ApiRequest::delete(resource.item_path(&ws, id))).await?;
            Ok(Outcome::done())
        })
        .await)
    }

    /// Reset an entity to its state in the latest published version.
    pub(crate) async fn revert_entity(
        &self,
        resource: Resource,
        scope: Scope<'_>,
        id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), scope.account_id, scope.container_id, scope.workspace_id).await?;
            let path = format!("{}:revert", resource.item_path(&ws, id));
            let reverted = api.execute(ApiRequest::post(path)).await?;
            Ok(Outcome::entity(resource.key, reverted))
        })
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::testing::client_with;
    use reqwest::Method;
    use serde_json::json;

    const ZONES: Resource = Resource {
        collection: "zones",
        list_field: "zone",
        key: "zone",
        plural: "zones",
    };

    #[test]
    fn test_paths() {
        let ws = "accounts/1/containers/2/workspaces/3";
        assert_eq!(ZONES.collection_path(ws), "accounts/1/containers/2/workspaces/3/zones");
        assert_eq!(ZONES.item_path(ws, "9"), "accounts/1/containers/2/workspaces/3/zones/9");
    }

    #[tokio::test]
    async fn test_revert_posts_to_revert_suffix() {
        let mock = MockApi::new();
        let path = "accounts/1/containers/2/workspaces/3/zones/9:revert";
        mock.respond(Method::POST, path, json!({"zone": {"zoneId": "9"}}));
        let client = client_with(&mock);

        let outcome = client
            .revert_entity(ZONES, Scope::new("1", "2", Some("3")), "9")
            .await
            .unwrap();
        assert_eq!(outcome.to_json()["zone"], json!({"zone": {"zoneId": "9"}}));
    }

    #[tokio::test]
    async fn test_resolution_failure_becomes_outcome() {
        let mock = MockApi::new();
        mock.fail(Method::GET, "accounts/1/containers/2/workspaces", "Forbidden");
        let client = client_with(&mock);

        let outcome = client.list_entities(ZONES, Scope::new("1", "2", None)).await.unwrap();
        assert_eq!(
            outcome.to_json(),
            json!({"success": false, "error": "Failed to get workspace: Forbidden"})
        );
    }

    #[tokio::test]
    async fn test_not_initialized_before_authentication() {
        let client = crate::api::testing::unauthenticated_client();
        let err = client
            .delete_entity(ZONES, Scope::new("1", "2", None), "9")
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotInitialized);
    }
}
