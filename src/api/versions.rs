//! Container versions, version headers and publishing.

use serde_json::{json, Value};

use super::{container_path, list_all, read_merge_write, settle, workspace_path, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

pub const DEFAULT_VERSION_NAME: &str = "Published via MCP";

fn version_path(account_id: &str, container_id: &str, version_id: &str) -> String {
    format!("{}/versions/{}", container_path(account_id, container_id), version_id)
}

impl GtmClient {
    pub async fn list_versions(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/versions", container_path(account_id, container_id));
            let versions = list_all(api.as_ref(), &path, "containerVersion").await?;
            Ok(Outcome::entity("versions", versions))
        })
        .await)
    }

    /// A version with all the entities it contains.
    pub async fn get_version(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = version_path(account_id, container_id, version_id);
            let version = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("version", version))
        })
        .await)
    }

    pub async fn update_version(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt("name", name)
                .set_opt("description", description);
            let path = version_path(account_id, container_id, version_id);
            let version = read_merge_write(api.as_ref(), &path, patch).await?;
            Ok(Outcome::entity("version", version))
        })
        .await)
    }

    /// Soft delete; see [`GtmClient::undelete_version`].
    pub async fn delete_version(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = version_path(account_id, container_id, version_id);
            api.execute(ApiRequest::delete(path)).await?;
            Ok(Outcome::done())
        })
        .await)
    }

    pub async fn undelete_version(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
    ) -> Result<Outcome, ServiceError> {
        self.version_action(account_id, container_id, version_id, "undelete")
            .await
    }

    pub async fn set_latest_version(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
    ) -> Result<Outcome, ServiceError> {
        self.version_action(account_id, container_id, version_id, "set_latest")
            .await
    }

    async fn version_action(
        &self,
        account_id: &str,
        container_id: &str,
        version_id: &str,
        action: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}:{}", version_path(account_id, container_id, version_id), action);
            let version = api.execute(ApiRequest::post(path)).await?;
            Ok(Outcome::entity("version", version))
        })
        .await)
    }

    pub async fn get_live_version(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/versions:live", container_path(account_id, container_id));
            let version = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("version", version))
        })
        .await)
    }

    pub async fn list_version_headers(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/version_headers", container_path(account_id, container_id));
            let headers = list_all(api.as_ref(), &path, "containerVersionHeader").await?;
            Ok(Outcome::entity("versionHeaders", headers))
        })
        .await)
    }

    pub async fn get_latest_version_header(
        &self,
        account_id: &str,
        container_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/version_headers:latest", container_path(account_id, container_id));
            let header = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("versionHeader", header))
        })
        .await)
    }

    /// Snapshot the default workspace into a new version and publish it.
    ///
    /// Two calls: `create_version` on the workspace, then `publish` on the
    /// returned version path. Nothing is published when the first response
    /// carries no path.
    pub async fn publish_version(
        &self,
        account_id: &str,
        container_id: &str,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, None).await?;
            let body = json!({
                "name": name.unwrap_or(DEFAULT_VERSION_NAME),
                "notes": notes.unwrap_or(""),
            });
            let created = api
                .execute(ApiRequest::post(format!("{}:create_version", ws)).body(body))
                .await?;

            let Some(created_path) = created
                .get("containerVersion")
                .and_then(|v| v.get("path"))
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
            else {
                return Ok(Outcome::Failure(
                    "Could not extract version path from response".to_string(),
                ));
            };

            let published = api
                .execute(ApiRequest::post(format!("{}:publish", created_path)))
                .await?;
            Ok(Outcome::entity("version", published))
        })
        .await)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::mock::MockApi;
    use crate::api::testing::client_with;
    use reqwest::Method;
    use serde_json::json;

    const CONTAINER: &str = "accounts/1/containers/2";

    #[tokio::test]
    async fn test_publish_creates_then_publishes_by_path() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({"workspace": [{"workspaceId": "3"}]}));
        mock.respond(
            Method::POST,
            &format!("{CONTAINER}/workspaces/3:create_version"),
            json!({"containerVersion": {"path": "accounts/1/containers/2/versions/12"}}),
        );
        mock.respond(
            Method::POST,
            &format!("{CONTAINER}/versions/12:publish"),
            json!({"containerVersion": {"containerVersionId": "12"}}),
        );
        let client = client_with(&mock);

        let outcome = client.publish_version("1", "2", None, None).await.unwrap();
        assert_eq!(
            outcome.to_json(),
            json!({"success": true, "version": {"containerVersion": {"containerVersionId": "12"}}})
        );

        let create = mock.request(Method::POST, &format!("{CONTAINER}/workspaces/3:create_version"));
        assert_eq!(create.body, Some(json!({"name": "Published via MCP", "notes": ""})));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_publish_without_version_path_fails_before_publishing() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{CONTAINER}/workspaces"), json!({"workspace": [{"workspaceId": "3"}]}));
        mock.respond(
            Method::POST,
            &format!("{CONTAINER}/workspaces/3:create_version"),
            json!({"compilerError": true}),
        );
        let client = client_with(&mock);

        let outcome = client
            .publish_version("1", "2", Some("Release 4"), Some("new tags"))
            .await
            .unwrap();
        assert_eq!(
            outcome.to_json(),
            json!({"success": false, "error": "Could not extract version path from response"})
        );
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_version_headers_and_latest() {
        let mock = MockApi::new();
        mock.respond(
            Method::GET,
            &format!("{CONTAINER}/version_headers"),
            json!({"containerVersionHeader": [{"containerVersionId": "1"}]}),
        );
        mock.respond(
            Method::GET,
            &format!("{CONTAINER}/version_headers:latest"),
            json!({"containerVersionId": "1"}),
        );
        let client = client_with(&mock);

        let headers = client.list_version_headers("1", "2").await.unwrap();
        assert_eq!(headers.to_json()["versionHeaders"], json!([{"containerVersionId": "1"}]));

        let latest = client.get_latest_version_header("1", "2").await.unwrap();
        assert_eq!(latest.to_json()["versionHeader"], json!({"containerVersionId": "1"}));
    }

    #[tokio::test]
    async fn test_set_latest_and_live() {
        let mock = MockApi::new();
        mock.respond(Method::POST, &format!("{CONTAINER}/versions/5:set_latest"), json!({"containerVersionId": "5"}));
        mock.respond(Method::GET, &format!("{CONTAINER}/versions:live"), json!({"containerVersionId": "4"}));
        let client = client_with(&mock);

        let latest = client.set_latest_version("1", "2", "5").await.unwrap();
        assert_eq!(latest.to_json()["version"]["containerVersionId"], "5");

        let live = client.get_live_version("1", "2").await.unwrap();
        assert_eq!(live.to_json()["version"]["containerVersionId"], "4");
    }
}
