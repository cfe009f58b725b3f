//! Variable operations.

use serde_json::{json, Value};

use super::{GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;

pub(crate) const VARIABLES: Resource = Resource {
    collection: "variables",
    list_field: "variable",
    key: "variable",
    plural: "variables",
};

/// Parameter key that carries a variable's value for the given type.
fn value_key(variable_type: &str) -> &'static str {
    match variable_type {
        "v" => "name",
        "jsm" => "javascript",
        _ => "value",
    }
}

fn value_parameter(key: &str, value: &str) -> Value {
    json!([{ "key": key, "value": value, "type": "template" }])
}

/// Changes to an existing variable; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct VariableChanges {
    pub name: Option<String>,
    pub variable_type: Option<String>,
    /// An empty value removes the parameter list.
    pub value: Option<String>,
}

impl VariableChanges {
    fn into_patch(self) -> Patch {
        let patch = Patch::new()
            .set_opt("name", self.name)
            .set_opt("type", self.variable_type);
        match self.value.as_deref() {
            Some("") => patch.remove("parameter"),
            Some(value) => patch.set("parameter", value_parameter("value", value)),
            None => patch,
        }
    }
}

impl GtmClient {
    /// Create a variable in the default workspace.
    pub async fn create_variable(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        variable_type: &str,
        value: &str,
    ) -> Result<Outcome, ServiceError> {
        let mut body = json!({ "name": name, "type": variable_type });
        if !value.is_empty() {
            body["parameter"] = value_parameter(value_key(variable_type), value);
        }
        self.create_entity(VARIABLES, Scope::new(account_id, container_id, None), body)
            .await
    }

    pub async fn list_variables(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(VARIABLES, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(VARIABLES, Scope::new(account_id, container_id, workspace_id), variable_id)
            .await
    }

    pub async fn update_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
        changes: VariableChanges,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(VARIABLES, scope, variable_id, changes.into_patch())
            .await
    }

    pub async fn delete_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(VARIABLES, Scope::new(account_id, container_id, workspace_id), variable_id)
            .await
    }

    pub async fn revert_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(VARIABLES, Scope::new(account_id, container_id, workspace_id), variable_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::testing::client_with;
    use reqwest::Method;

    #[test]
    fn test_value_key_by_type() {
        assert_eq!(value_key("v"), "name");
        assert_eq!(value_key("c"), "value");
        assert_eq!(value_key("jsm"), "javascript");
        assert_eq!(value_key("u"), "value");
    }

    #[tokio::test]
    async fn test_create_data_layer_variable() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts/1/containers/2/workspaces", json!({"workspace": [{"workspaceId": "3"}]}));
        mock.respond(Method::POST, "accounts/1/containers/2/workspaces/3/variables", json!({"variableId": "8"}));
        let client = client_with(&mock);

        client
            .create_variable("1", "2", "DLV - page", "v", "page.type")
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::POST, "accounts/1/containers/2/workspaces/3/variables").body,
            Some(json!({
                "name": "DLV - page",
                "type": "v",
                "parameter": [{"key": "name", "value": "page.type", "type": "template"}]
            }))
        );
    }

    #[tokio::test]
    async fn test_update_variable_submits_read_fingerprint() {
        let mock = MockApi::new();
        mock.respond(Method::GET, "accounts/1/containers/2/workspaces", json!({"workspace": [{"workspaceId": "3"}]}));
        let path = "accounts/1/containers/2/workspaces/3/variables/1";
        mock.respond(Method::GET, path, json!({"variableId": "1", "name": "X", "fingerprint": "abc"}));
        mock.respond(Method::PUT, path, json!({"variableId": "1", "name": "Y", "fingerprint": "abd"}));
        let client = client_with(&mock);

        let changes = VariableChanges {
            name: Some("Y".into()),
            ..Default::default()
        };
        let outcome = client.update_variable("1", "2", "1", changes, None).await.unwrap();
        assert!(outcome.is_success());

        let body = mock.request(Method::PUT, path).body.unwrap();
        assert_eq!(body["fingerprint"], "abc");
        assert_eq!(body["name"], "Y");
    }

    #[tokio::test]
    async fn test_update_with_empty_value_removes_parameter() {
        let mock = MockApi::new();
        let path = "accounts/1/containers/2/workspaces/3/variables/1";
        mock.respond(Method::GET, path, json!({"variableId": "1", "parameter": [{"key": "value", "value": "a"}]}));
        mock.respond(Method::PUT, path, json!({"variableId": "1"}));
        let client = client_with(&mock);

        let changes = VariableChanges {
            value: Some(String::new()),
            ..Default::default()
        };
        client.update_variable("1", "2", "1", changes, Some("3")).await.unwrap();
        assert_eq!(mock.request(Method::PUT, path).body, Some(json!({"variableId": "1"})));
    }
}
