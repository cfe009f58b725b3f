//! Server-side tagging entities: clients, Google tag configs,
//! transformations and zones.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{GtmClient, Outcome, Patch, Resource, Scope};
use crate::error::ServiceError;

pub(crate) const CLIENTS: Resource = Resource {
    collection: "clients",
    list_field: "client",
    key: "client",
    plural: "clients",
};

pub(crate) const GTAG_CONFIGS: Resource = Resource {
    collection: "gtag_config",
    list_field: "gtagConfig",
    key: "gtagConfig",
    plural: "gtagConfigs",
};

pub(crate) const TRANSFORMATIONS: Resource = Resource {
    collection: "transformations",
    list_field: "transformation",
    key: "transformation",
    plural: "transformations",
};

pub(crate) const ZONES: Resource = Resource {
    collection: "zones",
    list_field: "zone",
    key: "zone",
    plural: "zones",
};

/// A GTM entity parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    /// Parameter key
    pub key: String,
    /// Parameter value
    pub value: String,
    /// Parameter type (e.g., template, boolean, integer)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
}

pub(crate) fn parameter_list(parameters: &[Parameter]) -> Value {
    Value::Array(
        parameters
            .iter()
            .map(|p| {
                let mut entry = json!({ "key": p.key, "value": p.value });
                if let Some(kind) = &p.parameter_type {
                    entry["type"] = Value::String(kind.clone());
                }
                entry
            })
            .collect(),
    )
}

/// Entity body with an optional `parameter` list that is left out when empty.
fn with_parameters(mut body: Value, parameters: &[Parameter]) -> Value {
    if !parameters.is_empty() {
        body["parameter"] = parameter_list(parameters);
    }
    body
}

impl GtmClient {
    // Clients

    pub async fn list_clients(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(CLIENTS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_client(
        &self,
        account_id: &str,
        container_id: &str,
        client_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(CLIENTS, Scope::new(account_id, container_id, workspace_id), client_id)
            .await
    }

    pub async fn create_client(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        client_type: &str,
        parameters: &[Parameter],
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let body = with_parameters(json!({ "name": name, "type": client_type }), parameters);
        self.create_entity(CLIENTS, Scope::new(account_id, container_id, workspace_id), body)
            .await
    }

    pub async fn update_client(
        &self,
        account_id: &str,
        container_id: &str,
        client_id: &str,
        name: Option<String>,
        parameters: Option<&[Parameter]>,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let patch = Patch::new()
            .set_opt("name", name)
            .set_opt("parameter", parameters.map(parameter_list));
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(CLIENTS, scope, client_id, patch).await
    }

    pub async fn delete_client(
        &self,
        account_id: &str,
        container_id: &str,
        client_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(CLIENTS, Scope::new(account_id, container_id, workspace_id), client_id)
            .await
    }

    pub async fn revert_client(
        &self,
        account_id: &str,
        container_id: &str,
        client_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(CLIENTS, Scope::new(account_id, container_id, workspace_id), client_id)
            .await
    }

    // Google tag configs

    pub async fn list_gtag_configs(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(GTAG_CONFIGS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_gtag_config(
        &self,
        account_id: &str,
        container_id: &str,
        config_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(GTAG_CONFIGS, Scope::new(account_id, container_id, workspace_id), config_id)
            .await
    }

    pub async fn create_gtag_config(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        parameters: &[Parameter],
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let body = with_parameters(json!({ "tagId": tag_id }), parameters);
        self.create_entity(GTAG_CONFIGS, Scope::new(account_id, container_id, workspace_id), body)
            .await
    }

    pub async fn update_gtag_config(
        &self,
        account_id: &str,
        container_id: &str,
        config_id: &str,
        tag_id: Option<String>,
        parameters: Option<&[Parameter]>,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let patch = Patch::new()
            .set_opt("tagId", tag_id)
            .set_opt("parameter", parameters.map(parameter_list));
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(GTAG_CONFIGS, scope, config_id, patch).await
    }

    pub async fn delete_gtag_config(
        &self,
        account_id: &str,
        container_id: &str,
        config_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.delete_entity(GTAG_CONFIGS, Scope::new(account_id, container_id, workspace_id), config_id)
            .await
    }

    pub async fn revert_gtag_config(
        &self,
        account_id: &str,
        container_id: &str,
        config_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.revert_entity(GTAG_CONFIGS, Scope::new(account_id, container_id, workspace_id), config_id)
            .await
    }

    // Transformations

    pub async fn list_transformations(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(TRANSFORMATIONS, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_transformation(
        &self,
        account_id: &str,
        container_id: &str,
        transformation_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.get_entity(TRANSFORMATIONS, scope, transformation_id).await
    }

    pub async fn create_transformation(
        &self,
        account_id: &str,
        container_id: &str,
        name: &str,
        transformation_type: &str,
        parameters: &[Parameter],
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let body = with_parameters(json!({ "name": name, "type": transformation_type }), parameters);
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.create_entity(TRANSFORMATIONS, scope, body).await
    }

    pub async fn update_transformation(
        &self,
        account_id: &str,
        container_id: &str,
        transformation_id: &str,
        name: Option<String>,
        parameters: Option<&[Parameter]>,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let patch = Patch::new()
            .set_opt("name", name)
            .set_opt("parameter", parameters.map(parameter_list));
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.update_entity(TRANSFORMATIONS, scope, transformation_id, patch)
            .await
    }

    pub async fn delete_transformation(
        &self,
        account_id: &str,
        container_id: &str,
        transformation_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.delete_entity(TRANSFORMATIONS, scope, transformation_id).await
    }

    pub async fn revert_transformation(
        &self,
        account_id: &str,
        container_id: &str,
        transformation_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let scope = Scope::new(account_id, container_id, workspace_id);
        self.revert_entity(TRANSFORMATIONS, scope, transformation_id).await
    }

    // Zones

    pub async fn list_zones(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.list_entities(ZONES, Scope::new(account_id, container_id, workspace_id))
            .await
    }

    pub async fn get_zone(
        &self,
        account_id: &str,
        container_id: &str,
        zone_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        self.get_entity(ZONES, Scope::new(account_id, container_id, workspace_id), zone_id)
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

    fn param(key: &str, value: &str, kind: Option<&str>) -> Parameter {
        Parameter {
            key: key.into(),
            value: value.into(),
            parameter_type: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_parameter_list_omits_missing_type() {
        let list = parameter_list(&[param("a", "1", Some("template")), param("b", "2", None)]);
        assert_eq!(
            list,
            json!([{"key": "a", "value": "1", "type": "template"}, {"key": "b", "value": "2"}])
        );
    }

    #[tokio::test]
    async fn test_create_client_without_parameters() {
        let mock = MockApi::new();
        mock.respond(Method::POST, &format!("{WS}/clients"), json!({"clientId": "4"}));
        let client = client_with(&mock);

        let outcome = client
            .create_client("1", "2", "GA4 client", "GA4", &[], Some("3"))
            .await
            .unwrap();
        assert_eq!(outcome.to_json()["client"], json!({"clientId": "4"}));
        assert_eq!(
            mock.request(Method::POST, &format!("{WS}/clients")).body,
            Some(json!({"name": "GA4 client", "type": "GA4"}))
        );
    }

    #[tokio::test]
    async fn test_gtag_config_lives_under_singular_collection() {
        let mock = MockApi::new();
        mock.respond(Method::POST, &format!("{WS}/gtag_config"), json!({"gtagConfigId": "6"}));
        mock.respond(Method::GET, &format!("{WS}/gtag_config"), json!({"gtagConfig": [{"gtagConfigId": "6"}]}));
        let client = client_with(&mock);

        client
            .create_gtag_config("1", "2", "G-ABC", &[param("send_page_view", "false", Some("boolean"))], Some("3"))
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::POST, &format!("{WS}/gtag_config")).body,
            Some(json!({
                "tagId": "G-ABC",
                "parameter": [{"key": "send_page_view", "value": "false", "type": "boolean"}]
            }))
        );

        let listed = client.list_gtag_configs("1", "2", Some("3")).await.unwrap();
        assert_eq!(listed.to_json()["gtagConfigs"], json!([{"gtagConfigId": "6"}]));
    }

    #[tokio::test]
    async fn test_update_transformation_replaces_parameters() {
        let mock = MockApi::new();
        let path = format!("{WS}/transformations/8");
        mock.respond(
            Method::GET,
            &path,
            json!({"transformationId": "8", "name": "T", "fingerprint": "1", "parameter": []}),
        );
        mock.respond(Method::PUT, &path, json!({"transformationId": "8"}));
        let client = client_with(&mock);

        let params = [param("allow", "true", None)];
        client
            .update_transformation("1", "2", "8", None, Some(&params[..]), Some("3"))
            .await
            .unwrap();
        assert_eq!(
            mock.request(Method::PUT, &path).body,
            Some(json!({
                "transformationId": "8",
                "name": "T",
                "fingerprint": "1",
                "parameter": [{"key": "allow", "value": "true"}]
            }))
        );
    }

    #[tokio::test]
    async fn test_get_zone() {
        let mock = MockApi::new();
        mock.respond(Method::GET, &format!("{WS}/zones/2"), json!({"zoneId": "2"}));
        let client = client_with(&mock);

        let outcome = client.get_zone("1", "2", "2", Some("3")).await.unwrap();
        assert_eq!(outcome.to_json(), json!({"success": true, "zone": {"zoneId": "2"}}));
    }
}
