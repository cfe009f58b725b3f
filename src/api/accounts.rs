//! Account operations.

use serde_json::Value;

use super::{account_path, list_all, read_merge_write, settle, GtmClient, Outcome, Patch};
use crate::error::ServiceError;
use crate::rest::ApiRequest;

impl GtmClient {
    /// List all accounts visible to the authenticated user.
    pub async fn list_accounts(&self) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let accounts = list_all(api.as_ref(), "accounts", "account").await?;
            Ok(Outcome::entity("accounts", accounts))
        })
        .await)
    }

    pub async fn get_account(&self, account_id: &str) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let account = api.execute(ApiRequest::get(account_path(account_id))).await?;
            Ok(Outcome::entity("account", account))
        })
        .await)
    }

    pub async fn update_account(
        &self,
        account_id: &str,
        name: Option<String>,
        share_data: Option<bool>,
    ) -> Result<Outcome, ServiceError> {
        let api = self.api().await?;
        Ok(settle(async {
            let patch = Patch::new()
                .set_opt("name", name)
                .set_opt("shareData", share_data.map(Value::Bool));
            let account = read_merge_write(api.as_ref(), &account_path(account_id), patch).await?;
            Ok(Outcome::entity("account", account))
        })
        .await)
    }
}
