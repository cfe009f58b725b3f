//! Account-level user permissions.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{account_path, list_all, read_merge_write, settle, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

/// Access granted on one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContainerAccess {
    /// GTM container ID
    pub container_id: String,
    /// Container permission (read, edit, approve, publish)
    pub permission: String,
}

fn container_access_body(entries: &[ContainerAccess]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| json!({ "containerId": entry.container_id, "permission": entry.permission }))
            .collect(),
    )
}

fn permission_path(account_id: &str, permission_id: &str) -> String {
    format!("{}/user_permissions/{}", account_path(account_id), permission_id)
}

impl GtmClient {
    pub async fn list_user_permissions(&self, account_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/user_permissions", account_path(account_id));
            let permissions = list_all(api.as_ref(), &path, "userPermission").await?;
            Ok(Outcome::entity("userPermissions", permissions))
        })
        .await)
    }

    pub async fn get_user_permission(&self, account_id: &str, permission_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let permission = api
                .execute(ApiRequest::get(permission_path(account_id, permission_id)))
                .await?;
            Ok(Outcome::entity("userPermission", permission))
        })
        .await)
    }

    /// Grant a user access to the account and, optionally, to containers.
    pub async fn create_user_permission(
        &self,
        account_id: &str,
        email_address: &str,
        account_access_permission: &str,
        container_access: &[ContainerAccess],
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let mut body = json!({
                "emailAddress": email_address,
                "accountAccess": { "permission": account_access_permission },
            });
            if !container_access.is_empty() {
                body["containerAccess"] = container_access_body(container_access);
            }
            let path = format!("{}/user_permissions", account_path(account_id));
            let created = api.execute(ApiRequest::post(path).body(body)).await?;
            Ok(Outcome::entity("userPermission", created))
        })
        .await)
    }

    pub async fn update_user_permission(
        &self,
        account_id: &str,
        permission_id: &str,
        account_access_permission: Option<&str>,
        container_access: Option<&[ContainerAccess]>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt(
                    "accountAccess",
                    account_access_permission.map(|permission| json!({ "permission": permission })),
                )
                .set_opt("containerAccess", container_access.map(container_access_body));
            let path = permission_path(account_id, permission_id);
            let permission = read_merge_write(api.as_ref(), &path, patch).await?;
            Ok(Outcome::entity("userPermission", permission))
        })
        .await)
    }

    /// Revoke a user's access.
    pub async fn delete_user_permission(&self, account_id: &str, permission_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            api.execute(ApiRequest::delete(permission_path(account_id, permission_id)))
                .await?;
            Ok(Outcome::done())
        })
        .await)
    }
}
