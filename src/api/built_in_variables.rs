//! Built-in variable operations. Built-ins are addressed by type
//! (`PAGE_URL`, `CLICK_ELEMENT`, ...) rather than by id.

use serde_json::Value;

use super::{list_all, settle, workspace_path, GtmClient, Outcome};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

impl GtmClient {
    pub async fn list_built_in_variables(
        &self,
        account_id: &str,
        container_id: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let path = format!("{}/built_in_variables", ws);
            let variables = list_all(api.as_ref(), &path, "builtInVariable").await?;
            Ok(Outcome::entity("builtInVariables", variables))
        })
        .await)
    }

    /// Enable a built-in variable.
    pub async fn create_built_in_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_type: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let request = ApiRequest::post(format!("{}/built_in_variables", ws)).query("type", variable_type);
            let created = api.execute(request).await?;
            Ok(Outcome::entity("builtInVariable", created))
        })
        .await)
    }

    /// Disable a built-in variable.
    pub async fn delete_built_in_variable(
        &self,
        account_id: &str,
        container_id: &str,
        variable_type: &str,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let path = format!("{}/built_in_variables/{}", ws, variable_type);
            api.execute(ApiRequest::delete(path)).await?;
            Ok(Outcome::done())
        })
        .await)
    }

    /// Revert built-ins to the latest published version, optionally
    /// restricted to one type.
    pub async fn revert_built_in_variables(
        &self,
        account_id: &str,
        container_id: &str,
        variable_type: Option<&str>,
        workspace_id: Option<&str>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let ws = workspace_path(api.as_ref(), account_id, container_id, workspace_id).await?;
            let mut request = ApiRequest::post(format!("{}/built_in_variables:revert", ws));
            if let Some(variable_type) = variable_type.filter(|t| !t.is_empty()) {
                request = request.query("type", variable_type);
            }
            let response = api.execute(request).await?;
            let reverted = response
                .get("builtInVariable")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            Ok(Outcome::entity("builtInVariables", reverted))
        })
        .await)
    }
}
