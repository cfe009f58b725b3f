//! Custom templates, including imports from the Community Template Gallery.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{settle, workspace_path, GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

pub(crate) const TEMPLATES: Resource = Resource {
    collection: "templates",
    list_field: "template",
    key: "template",
    plural: "templates",
};

/// Location of a template in the Community Template Gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GalleryReference {
    /// Gallery host (e.g., github.com)
    pub host: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Template signature (commit SHA)
    pub signature: String,
}

impl GtmClient {
    pub async fn list_templates(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(TEMPLATES, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_template(
        &self,
        account_id: &str,
        container_id: &str,
        template_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(TEMPLATES, Scope::new(account_id, container_id, workspace_id), template_id)
            .await
    }

    pub async fn create_template(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        template_data: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let body = json!({ "name": name, "templateData": template_data });
        self.create_entity(TEMPLATES, Scope::new(account_id, container_id, workspace_id), body)
            .await
    }

    pub async fn update_template(
        &self,
        account_id: &str,
        container_id: &str,
        template_id: &str,
        name: Option<String>,
        template_data: Option<String>,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let patch = Patch::new()
            .set_opt("name", name)
            .set_opt("templateData", template_data);
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(TEMPLATES, scope, template_id, patch).await
    }

    pub async fn delete_template(
        &self,
        account_id: &str,
        container_id: &str,
        template_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(TEMPLATES, Scope::new(account_id, container_id, workspace_id), template_id)
            .await
    }

    pub async fn revert_template(
        &self,
        account_id: &str,
        container_id: &str,
        template_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(TEMPLATES, Scope::new(account_id, container_id, workspace_id), template_id)
            .await
    }

    pub async fn import_template_from_gallery(
        &self,
        account_id: &str,
        container_id: &str,
        gallery: &GalleryReference,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let body = json!({
                "galleryReference": {
                    "host": gallery.host,
                    "owner": gallery.owner,
                    "repository": gallery.repository,
                    "signature": gallery.signature,
                }
            });
            let path = format!("{}:import_from_gallery", TEMPLATES.collection_path(&ws));
            let template = api.execute(ApiRequest::post(path).body(body)).await?;
            Ok(Outcome::entity("template", template))
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

    #[tokio::test]
    async fn test_import_from_gallery() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts/1/containers/2/workspaces", json!({"workspace": [{"workspaceId": "3"}]}));
        let path = "accounts/1/containers/2/workspaces/3/templates:import_from_gallery";
        mock.respond(Method::POST, path, json!({"templateId": "12", "name": "Consent"}));
        let client = client_with(&mock);

        let gallery = GalleryReference {
            host: "github.com".into(),
            owner: "gtm-templates".into(),
            repository: "consent".into(),
            signature: "a1b2c3".into(),
        };
        let outcome = client
            .import_template_from_gallery("1", "2", &gallery, None)
            .await
            .unwrap();

        assert_eq!(outcome.to_json()["template"]["templateId"], "12");
        assert_eq!(
            mock.request(Method::POST, path).body,
            Some(json!({
                "galleryReference": {
                    "host": "github.com",
                    "owner": "gtm-templates",
                    "repository": "consent",
                    "signature": "a1b2c3"
                }
            }))
        );
    }

    #[tokio::test]
    async fn test_create_template_body() {
        let mock = MockApi::new();
        let path = "accounts/1/containers/2/workspaces/3/templates";
        mock.respond(Method::POST, path, json!({"templateId": "4"}));
        let client = client_with(&mock);

        client
            .create_template("1", "2", "My Tag", "___INFO___\n{}", Some("3"))
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::POST, path).body,
            Some(json!({"name": "My Tag", "templateData": "___INFO___\n{}"}))
        );
    }
}
