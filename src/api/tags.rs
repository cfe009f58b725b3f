//! Tag operations.

use serde_json::{json, Map, Value};

use super::{template_parameters, GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;

pub(crate) const TAGS: Resource = Resource {
    collection: "tags",
    list_field: "tag",
    key: "tag",
    plural: "tags",
};

/// Changes to an existing tag; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TagChanges {
    pub name: Option<String>,
    pub tag_type: Option<String>,
    /// Replaces the whole parameter list.
    pub parameters: Option<Map<String, Value>>,
    pub firing_trigger_id: Option<Vec<String>>,
    pub blocking_trigger_id: Option<Vec<String>>,
    pub tag_firing_option: Option<String>,
}

impl TagChanges {
    fn into_patch(self) -> Patch {
        Patch::new()
            .set_opt("name", self.name)
            .set_opt("type", self.tag_type)
            .set_opt("firingTriggerId", self.firing_trigger_id)
            .set_opt("blockingTriggerId", self.blocking_trigger_id)
            .set_opt("tagFiringOption", self.tag_firing_option)
            .set_opt("parameter", self.parameters.as_ref().map(template_parameters))
    }
}

impl GtmClient {
    /// Create a tag in the container's default workspace.
    pub async fn create_tag(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        tag_type: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Outcome, ServiceError> {
        let body = json!({
            "name": name,
            "type": tag_type,
            "parameter": template_parameters(parameters),
        });
        self.create_entity(TAGS, Scope::new(account_id, container_id, None), body)
            .await
    }

    pub async fn list_tags(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(TAGS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_tag(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(TAGS, Scope::new(account_id, container_id, workspace_id), tag_id)
            .await
    }

    pub async fn update_tag(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        changes: TagChanges,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(TAGS, scope, tag_id, changes.into_patch())
            .await
    }

    pub async fn delete_tag(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(TAGS, Scope::new(account_id, container_id, workspace_id), tag_id)
            .await
    }

    pub async fn revert_tag(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(TAGS, Scope::new(account_id, container_id, workspace_id), tag_id)
            .await
    }
}
