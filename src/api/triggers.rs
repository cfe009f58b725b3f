//! Trigger operations.

use serde_json::{json, Number, Value};

use super::{GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;

pub(crate) const TRIGGERS: Resource = Resource {
    collection: "triggers",
    list_field: "trigger",
    key: "trigger",
    plural: "triggers",
};

/// Changes to an existing trigger; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TriggerChanges {
    pub name: Option<String>,
    pub trigger_type: Option<String>,
    /// An empty list removes `customEventFilter`.
    pub conditions: Option<Vec<Value>>,
    pub wait_for_tags: Option<bool>,
    pub wait_for_tags_timeout: Option<Number>,
    pub check_validation: Option<bool>,
}

impl TriggerChanges {
    fn into_patch(self) -> Patch {
        let patch = Patch::new()
            .set_opt("name", self.name)
            .set_opt("type", self.trigger_type)
            .set_opt("waitForTags", self.wait_for_tags)
            .set_opt("waitForTagsTimeout", self.wait_for_tags_timeout)
            .set_opt("checkValidation", self.check_validation);
        match self.conditions {
            Some(conditions) if conditions.is_empty() => patch.remove("customEventFilter"),
            Some(conditions) => patch.set("customEventFilter", conditions),
            None => patch,
        }
    }
}

impl GtmClient {
    /// Create a trigger in the default workspace. Conditions, when given,
    /// become the trigger's `customEventFilter`.
    pub async fn create_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        trigger_type: &str,
        conditions: Vec<Value>,
    ) -> Result<Outcome, ServiceError> {
        let mut body = json!({ "name": name, "type": trigger_type });
        if !conditions.is_empty() {
            body["customEventFilter"] = Value::Array(conditions);
        }
        self.create_entity(TRIGGERS, Scope::new(account_id, container_id, None), body)
            .await
    }

    pub async fn list_triggers(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(TRIGGERS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(TRIGGERS, Scope::new(account_id, container_id, workspace_id), trigger_id)
            .await
    }

    pub async fn update_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
        changes: TriggerChanges,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(TRIGGERS, scope, trigger_id, changes.into_patch())
            .await
    }

    pub async fn delete_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(TRIGGERS, Scope::new(account_id, container_id, workspace_id), trigger_id)
            .await
    }

    pub async fn revert_trigger(
        &self,
        account_id: &str,
        container_id: &str,
        trigger_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(TRIGGERS, Scope::new(account_id, container_id, workspace_id), trigger_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::testing::client_with;
    use reqwest::Method;

    const WS: &str = "accounts/1/containers/2/workspaces/3";

    fn with_default_workspace() -> std::sync::Arc<MockApi> {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts/1/containers/2/workspaces", json!({"workspace": [{"workspaceId": "3"}]}));
        mock
    }

    #[tokio::test]
    async fn test_create_trigger_without_conditions_has_no_filter() {
        let mock = with_default_workspace();
        mock.respond(Method::POST, &format!("{WS}/triggers"), json!({"triggerId": "5"}));
        let client = client_with(&mock);

        client
            .create_trigger("1", "2", "All Pages", "pageview", Vec::new())
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::POST, &format!("{WS}/triggers")).body,
            Some(json!({"name": "All Pages", "type": "pageview"}))
        );
    }

    #[tokio::test]
    async fn test_create_trigger_with_conditions() {
        let mock = with_default_workspace();
        mock.respond(Method::POST, &format!("{WS}/triggers"), json!({"triggerId": "5"}));
        let client = client_with(&mock);

        let condition = json!({"type": "equals", "parameter": [{"key": "arg0", "value": "{{_event}}", "type": "template"}]});
        client
            .create_trigger("1", "2", "Custom", "customEvent", vec![condition.clone()])
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::POST, &format!("{WS}/triggers")).body,
            Some(json!({"name": "Custom", "type": "customEvent", "customEventFilter": [condition]}))
        );
    }

    #[tokio::test]
    async fn test_update_with_empty_conditions_removes_filter() {
        let mock = MockApi::new();
        let path = format!("{WS}/triggers/5");
        mock.respond(
            Method::GET,
            &path,
            json!({"triggerId": "5", "fingerprint": "f", "customEventFilter": [{"type": "equals"}]}),
        );
        mock.respond(Method::PUT, &path, json!({"triggerId": "5"}));
        let client = client_with(&mock);

        let changes = TriggerChanges {
            conditions: Some(Vec::new()),
            wait_for_tags: Some(true),
            ..Default::default()
        };
        client.update_trigger("1", "2", "5", changes, Some("3")).await.unwrap();

        assert_eq!(
            mock.request(Method::PUT, &path).body,
            Some(json!({"triggerId": "5", "fingerprint": "f", "waitForTags": true}))
        );
    }

    #[tokio::test]
    async fn test_update_sends_integer_timeout_unchanged() {
        let mock = MockApi::new();
        let path = format!("{WS}/triggers/5");
        mock.respond(Method::GET, &path, json!({"triggerId": "5", "fingerprint": "f"}));
        mock.respond(Method::PUT, &path, json!({"triggerId": "5"}));
        let client = client_with(&mock);

        let changes = TriggerChanges {
            wait_for_tags_timeout: Some(Number::from(2000)),
            ..Default::default()
        };
        client.update_trigger("1", "2", "5", changes, Some("3")).await.unwrap();

        let body = mock.request(Method::PUT, &path).body.unwrap();
        assert_eq!(body["waitForTagsTimeout"].to_string(), "2000");
    }
}
