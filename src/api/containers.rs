//! Container operations.

use serde_json::{json, Map, Value};

use super::{account_path, container_path, list_all, read_merge_write, settle, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

/// Fields for a new container.
#[derive(Debug, Clone, Default)]
pub struct NewContainer {
    pub name: String,
    /// Defaults to `["web"]` when empty.
    pub usage_context: Vec<String>,
    pub domain_name: Option<Vec<String>>,
    pub time_zone_country_id: Option<String>,
    pub time_zone_id: Option<String>,
    pub notes: Option<String>,
}

/// Changes to an existing container; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContainerChanges {
    pub name: Option<String>,
    pub domain_name: Option<Vec<String>>,
    pub time_zone_country_id: Option<String>,
    pub time_zone_id: Option<String>,
    pub notes: Option<String>,
}

impl NewContainer {
    fn into_body(self) -> Value {
        let usage_context = if self.usage_context.is_empty() {
            vec!["web".to_string()]
        } else {
            self.usage_context
        };

        let mut body = Map::new();
        body.insert("name".into(), Value::String(self.name));
        body.insert("usageContext".into(), json!(usage_context));
        if let Some(domains) = self.domain_name {
            body.insert("domainName".into(), json!(domains));
        }
        for (key, value) in [
            ("timeZoneCountryId", self.time_zone_country_id),
            ("timeZoneId", self.time_zone_id),
            ("notes", self.notes),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                body.insert(key.into(), Value::String(value));
            }
        }
        Value::Object(body)
    }
}

impl GtmClient {
    pub async fn list_containers(&self, account_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/containers", account_path(account_id));
            let containers = list_all(api.as_ref(), &path, "container").await?;
            Ok(Outcome::entity("containers", containers))
        })
        .await)
    }

    pub async fn get_container(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let container = api
                .execute(ApiRequest::get(container_path(account_id, container_id)))
                .await?;
            Ok(Outcome::entity("container", container))
        })
        .await)
    }

    pub async fn create_container(&self, account_id: &str, container: NewContainer) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let request = ApiRequest::post(format!("{}/containers", account_path(account_id)))
                .body(container.into_body());
            let created = api.execute(request).await?;
            Ok(Outcome::entity("container", created))
        })
        .await)
    }

    pub async fn update_container(
        &self,
        account_id: &str,
        container_id: &str,
        changes: ContainerChanges,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt("name", changes.name)
                .set_opt("domainName", changes.domain_name)
                .set_opt("timeZoneCountryId", changes.time_zone_country_id)
                .set_opt("timeZoneId", changes.time_zone_id)
                .set_opt("notes", changes.notes);
            let path = container_path(account_id, container_id);
            let container = read_merge_write(api.as_ref(), &path, patch).await?;
            Ok(Outcome::entity("container", container))
        })
        .await)
    }

    pub async fn delete_container(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            api.execute(ApiRequest::delete(container_path(account_id, container_id)))
                .await?;
            Ok(Outcome::done())
        })
        .await)
    }

    /// The container's install snippet; omitted from the result when the
    /// API returns none.
    pub async fn get_container_snippet(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}:snippet", container_path(account_id, container_id));
            let response = api.execute(ApiRequest::get(path)).await?;
            let snippet = response.get("snippet").cloned().unwrap_or(Value::Null);
            Ok(Outcome::entity("snippet", snippet))
        })
        .await)
    }

    /// Find a container by its public id (`GTM-XXXX`) or destination id.
    /// The lookup endpoint is not scoped to an account.
    pub async fn lookup_container(
        &self,
        public_id: Option<&str>,
        destination_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let mut request = ApiRequest::get("accounts/containers:lookup");
            if let Some(tag_id) = public_id.filter(|v| !v.is_empty()) {
                request = request.query("tagId", tag_id);
            }
            if let Some(destination) = destination_id.filter(|v| !v.is_empty()) {
                request = request.query("destinationId", destination);
            }
            let container = api.execute(request).await?;
            Ok(Outcome::entity("container", container))
        })
        .await)
    }

    /// Merge `source_container_id` into this container.
    pub async fn combine_containers(
        &self,
        account_id: &str,
        container_id: &str,
        source_container_id: &str,
        allow_user_variable_conflict: Option<bool>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let request = ApiRequest::post(format!("{}:combine", container_path(account_id, container_id)))
                .query("containerId", source_container_id);
            let body = json!({
                "sourceContainerId": source_container_id,
                "allowUserVariableConflict": allow_user_variable_conflict,
            });
            let container = api.execute(request.body(strip_nulls(body))).await?;
            Ok(Outcome::entity("container", container))
        })
        .await)
    }

    /// Move a tag id out of this container into another one.
    pub async fn move_tag_id(
        &self,
        account_id: &str,
        container_id: &str,
        tag_id: &str,
        destination_container_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let request = ApiRequest::post(format!("{}:move_tag_id", container_path(account_id, container_id)))
                .query("tagId", tag_id)
                .body(json!({
                    "tagId": tag_id,
                    "destinationContainerId": destination_container_id,
                }));
            let container = api.execute(request).await?;
            Ok(Outcome::entity("container", container))
        })
        .await)
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}
