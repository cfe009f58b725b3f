//! Container environments.

use serde_json::{json, Value};

use super::{container_path, list_all, read_merge_write, settle, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

fn environment_path(account_id: &str, container_id: &str, environment_id: &str) -> String {
    format!(
        "{}/environments/{}",
        container_path(account_id, container_id),
        environment_id
    )
}

/// Fields for a new environment.
#[derive(Debug, Clone, Default)]
pub struct NewEnvironment {
    pub name: String,
    /// `user`, `live` or `latest`.
    pub environment_type: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl NewEnvironment {
    fn into_body(self) -> Value {
        let mut body = json!({ "name": self.name, "type": self.environment_type });
        if let Some(description) = self.description.filter(|d| !d.is_empty()) {
            body["description"] = Value::String(description);
        }
        if let Some(url) = self.url.filter(|u| !u.is_empty()) {
            body["url"] = Value::String(url);
        }
        body
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl GtmClient {
    pub async fn list_environments(&self, account_id: &str, container_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/environments", container_path(account_id, container_id));
            let environments = list_all(api.as_ref(), &path, "environment").await?;
            Ok(Outcome::entity("environments", environments))
        })
        .await)
    }

    pub async fn get_environment(
        &self,
        account_id: &str,
        container_id: &str,
        environment_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = environment_path(account_id, container_id, environment_id);
            let environment = api.execute(ApiRequest::get(path)).await?;
            Ok(Outcome::entity("environment", environment))
        })
        .await)
    }

    pub async fn create_environment(
        &self,
        account_id: &str,
        container_id: &str,
        environment: NewEnvironment,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!("{}/environments", container_path(account_id, container_id));
            let created = api
                .execute(ApiRequest::post(path).body(environment.into_body()))
                .await?;
            Ok(Outcome::entity("environment", created))
        })
        .await)
    }

    pub async fn update_environment(
        &self,
        account_id: &str,
        container_id: &str,
        environment_id: &str,
        changes: EnvironmentChanges,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt("name", changes.name)
                .set_opt("description", changes.description)
                .set_opt("url", changes.url);
            let path = environment_path(account_id, container_id, environment_id);
            let environment = read_merge_write(api.as_ref(), &path, patch).await?;
            Ok(Outcome::entity("environment", environment))
        })
        .await)
    }

    pub async fn delete_environment(
        &self,
        account_id: &str,
        container_id: &str,
        environment_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = environment_path(account_id, container_id, environment_id);
            api.execute(ApiRequest::delete(path)).await?;
            Ok(Outcome::done())
        })
        .await)
    }

    /// Regenerate the environment's authorization code.
    pub async fn reauthorize_environment(
        &self,
        account_id: &str,
        container_id: &str,
        environment_id: &str,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let path = format!(
                "{}:reauthorize",
                environment_path(account_id, container_id, environment_id)
            );
            let environment = api.execute(ApiRequest::post(path)).await?;
            Ok(Outcome::entity("environment", environment))
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
    async fn test_create_environment_skips_empty_optionals() {
        let mock = MockApi::new();
        mock.respond(Method::POST, "accounts/1/containers/2/environments", json!({"environmentId": "5"}));
        let client = client_with(&mock);

        let environment = NewEnvironment {
            name: "Staging".into(),
            environment_type: "user".into(),
            description: Some(String::new()),
            url: Some("https://staging.example.com".into()),
        };
        let outcome = client.create_environment("1", "2", environment).await.unwrap();
        assert_eq!(outcome.to_json()["environment"], json!({"environmentId": "5"}));
        assert_eq!(
            mock.request(Method::POST, "accounts/1/containers/2/environments").body,
            Some(json!({"name": "Staging", "type": "user", "url": "https://staging.example.com"}))
        );
    }

    #[tokio::test]
    async fn test_reauthorize_posts_action() {
        let mock = MockApi::new();
        let path = "accounts/1/containers/2/environments/5:reauthorize";
        mock.respond(Method::POST, path, json!({"environmentId": "5", "authorizationCode": "new"}));
        let client = client_with(&mock);

        let outcome = client.reauthorize_environment("1", "2", "5").await.unwrap();
        assert_eq!(outcome.to_json()["environment"]["authorizationCode"], "new");
    }
}
