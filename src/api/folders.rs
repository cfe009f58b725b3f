//! Folder operations.

use serde_json::{json, Map, Value};

use super::{settle, workspace_path, GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

pub(crate) const FOLDERS: Resource = Resource {
    collection: "folders",
    list_field: "folder",
    key: "folder",
    plural: "folders",
};

/// Entity ids to move into a folder. Empty lists are not sent.
#[derive(Debug, Clone, Default)]
pub struct FolderMove {
    pub tag_ids: Vec<String>,
    pub trigger_ids: Vec<String>,
    pub variable_ids: Vec<String>,
}

impl FolderMove {
    fn into_body(self) -> Value {
        let mut body = Map::new();
        for (key, ids) in [
            ("tagId", self.tag_ids),
            ("triggerId", self.trigger_ids),
            ("variableId", self.variable_ids),
        ] {
            if !ids.is_empty() {
                body.insert(key.to_string(), json!(ids));
            }
        }
        Value::Object(body)
    }
}

impl GtmClient {
    pub async fn list_folders(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(FOLDERS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_folder(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(FOLDERS, Scope::new(account_id, container_id, workspace_id), folder_id)
            .await
    }

    pub async fn create_folder(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.create_entity(FOLDERS, scope, json!({ "name": name })).await
    }

    pub async fn update_folder(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        name: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(FOLDERS, scope, folder_id, Patch::new().set("name", name))
            .await
    }

    pub async fn delete_folder(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(FOLDERS, Scope::new(account_id, container_id, workspace_id), folder_id)
            .await
    }

    pub async fn revert_folder(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(FOLDERS, Scope::new(account_id, container_id, workspace_id), folder_id)
            .await
    }

    /// Move tags, triggers and variables into a folder. Succeeds without payload.
    pub async fn move_entities_to_folder(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        entities: FolderMove,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let path = format!("{}:move_entities_to_folder", FOLDERS.item_path(&ws, folder_id));
            api.execute(ApiRequest::post(path).body(entities.into_body()))
                .await?;
            Ok(Outcome::done())
        })
        .await)
    }

    pub async fn get_folder_entities(
        &self,
        account_id: &str,
        container_id: &str,
        folder_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let path = format!("{}:entities", FOLDERS.item_path(&ws, folder_id));
            let entities = api.execute(ApiRequest::post(path)).await?;
            Ok(Outcome::entity("entities", entities))
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

    const FOLDER: &str = "accounts/1/containers/2/workspaces/3/folders/4";

    #[tokio::test]
    async fn test_move_sends_only_non_empty_lists() {
        let mock = MockApi::new();
        let path = format!("{FOLDER}:move_entities_to_folder");
        mock.respond(Method::POST, &path, Value::Null);
        let client = client_with(&mock);

        let entities = FolderMove {
            tag_ids: vec!["10".into(), "11".into()],
            variable_ids: vec!["7".into()],
            ..Default::default()
        };
        let outcome = client
            .move_entities_to_folder("1", "2", "4", entities, Some("3"))
            .await
            .unwrap();

        assert_eq!(outcome.to_json(), json!({"success": true}));
        assert_eq!(
            mock.request(Method::POST, &path).body,
            Some(json!({"tagId": ["10", "11"], "variableId": ["7"]}))
        );
    }

    #[tokio::test]
    async fn test_folder_entities() {
        let mock = MockApi::new();
        mock.respond(Method::POST, &format!("{FOLDER}:entities"), json!({"tag": [{"tagId": "10"}]}));
        let client = client_with(&mock);

        let outcome = client.get_folder_entities("1", "2", "4", Some("3")).await.unwrap();
        assert_eq!(outcome.to_json()["entities"], json!({"tag": [{"tagId": "10"}]}));
    }

    #[tokio::test]
    async fn test_update_folder_renames() {
        let mock = MockApi::new();
        mock.respond(Method::GET, FOLDER, json!({"folderId": "4", "name": "Old", "fingerprint": "9"}));
        mock.respond(Method::PUT, FOLDER, json!({"folderId": "4", "name": "New"}));
        let client = client_with(&mock);

        let outcome = client.update_folder("1", "2", "4", "New", Some("3")).await.unwrap();
        assert_eq!(outcome.to_json()["folder"]["name"], "New");
        assert_eq!(
            mock.request(Method::PUT, FOLDER).body,
            Some(json!({"folderId": "4", "name": "New", "fingerprint": "9"}))
        );
    }
}
