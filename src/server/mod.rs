//! MCP server exposing Google Tag Manager as tools.

mod params;

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorCode, ErrorData as McpError, Implementation,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_router, RoleServer, ServerHandler,
};
use serde_json::json;

use crate::api::containers::{ContainerChanges, NewContainer};
use crate::api::environments::{EnvironmentChanges, NewEnvironment};
use crate::api::folders::FolderMove;
use crate::api::tags::TagChanges;
use crate::api::triggers::TriggerChanges;
use crate::api::variables::VariableChanges;
use crate::api::workspaces::BulkChanges;
use crate::api::{GtmClient, Outcome};
use crate::components::{self, DEFAULT_FORM_EVENT};
use crate::debug::DebugLogger;
use crate::error::ServiceError;

use params::*;

/// Google Tag Manager MCP Server.
#[derive(Clone)]
pub struct GtmServer {
    client: Arc<GtmClient>,
    debug: Arc<DebugLogger>,
    tool_router: ToolRouter<Self>,
}

impl GtmServer {
    pub fn new(client: Arc<GtmClient>, debug: Arc<DebugLogger>) -> Self {
        Self {
            client,
            debug,
            tool_router: Self::tool_router(),
        }
    }

    /// Checks run before dispatch. Authenticates lazily on first use and
    /// rejects names outside the catalog; `None` means the call may proceed.
    async fn preflight(&self, tool: &str) -> Option<CallToolResult> {
        if !self.client.is_authenticated().await {
            if let Err(e) = self.client.authenticate().await {
                self.debug.log_error(tool, &e.to_string());
                return Some(CallToolResult::error(vec![Content::text(format!(
                    "Authentication error: {}",
                    e
                ))]));
            }
        }

        if !self.tool_router.has_route(tool) {
            return Some(CallToolResult::error(vec![Content::text(format!(
                "Unknown tool: {}",
                tool
            ))]));
        }

        None
    }

    /// Render a façade outcome as the tool's text payload. Failure outcomes
    /// are ordinary results; only contract violations become errors.
    fn respond(&self, tool: &str, outcome: Result<Outcome, ServiceError>) -> Result<CallToolResult, McpError> {
        let outcome = outcome.map_err(|e| {
            self.debug.log_error(tool, &e.to_string());
            to_mcp_error(e)
        })?;

        let result = outcome.to_json();
        self.debug.log_tool_result(tool, &result);

        let text = serde_json::to_string_pretty(&result).map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Router and argument errors become error-flagged results, never protocol errors.
    fn fold_error(&self, tool: &str, result: Result<CallToolResult, McpError>) -> CallToolResult {
        match result {
            Ok(result) => result,
            Err(e) => {
                self.debug.log_error(tool, &e.message);
                CallToolResult::error(vec![Content::text(format!("Error: {}", e.message))])
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert any error to McpError
fn to_mcp_error<E: std::fmt::Display>(e: E) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl GtmServer {
    // ========================================================================
    // Quick Setup Tools
    // ========================================================================

    #[tool(description = "Create a GTM tag in a container")]
    async fn create_gtm_tag(&self, Parameters(p): Parameters<CreateTagParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_tag", &json!(p));

        let parameters = p.parameters.unwrap_or_default();
        let outcome = self
            .client
            .create_tag(&p.account_id, &p.container_id, &p.tag_name, &p.tag_type, &parameters)
            .await;

        self.respond("create_gtm_tag", outcome)
    }

    #[tool(description = "Create a GTM trigger")]
    async fn create_gtm_trigger(&self, Parameters(p): Parameters<CreateTriggerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_trigger", &json!(p));

        let outcome = self
            .client
            .create_trigger(
                &p.account_id,
                &p.container_id,
                &p.trigger_name,
                &p.trigger_type,
                p.conditions.unwrap_or_default(),
            )
            .await;

        self.respond("create_gtm_trigger", outcome)
    }

    #[tool(description = "Create a GTM variable")]
    async fn create_gtm_variable(&self, Parameters(p): Parameters<CreateVariableParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_variable", &json!(p));

        let outcome = self
            .client
            .create_variable(
                &p.account_id,
                &p.container_id,
                &p.variable_name,
                &p.variable_type,
                p.value.as_deref().unwrap_or(""),
            )
            .await;

        self.respond("create_gtm_variable", outcome)
    }

    #[tool(description = "Publish a GTM container version")]
    async fn publish_gtm_version(&self, Parameters(p): Parameters<PublishVersionParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("publish_gtm_version", &json!(p));

        let outcome = self
            .client
            .publish_version(&p.account_id, &p.container_id, p.name.as_deref(), p.notes.as_deref())
            .await;

        self.respond("publish_gtm_version", outcome)
    }

    #[tool(description = "Create complete Google Analytics 4 setup with config tag and common events")]
    async fn create_ga4_setup(&self, Parameters(p): Parameters<Ga4SetupParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_ga4_setup", &json!(p));

        let outcome =
            components::create_ga4_setup(&self.client, &p.account_id, &p.container_id, &p.measurement_id).await;

        self.respond("create_ga4_setup", outcome)
    }

    #[tool(description = "Create Facebook Pixel tracking setup")]
    async fn create_facebook_pixel_setup(
        &self,
        Parameters(p): Parameters<FacebookPixelSetupParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_facebook_pixel_setup", &json!(p));

        let outcome =
            components::create_facebook_pixel_setup(&self.client, &p.account_id, &p.container_id, &p.pixel_id).await;

        self.respond("create_facebook_pixel_setup", outcome)
    }

    #[tool(description = "Create form submission tracking setup")]
    async fn create_form_tracking(&self, Parameters(p): Parameters<FormTrackingParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_form_tracking", &json!(p));

        let outcome = components::create_form_tracking(
            &self.client,
            &p.account_id,
            &p.container_id,
            &p.form_selector,
            p.event_name.as_deref().unwrap_or(DEFAULT_FORM_EVENT),
        )
        .await;

        self.respond("create_form_tracking", outcome)
    }

    #[tool(description = "Generate complete workflows for different site types (ecommerce, lead_generation, content_site)")]
    async fn generate_gtm_workflow(&self, Parameters(p): Parameters<GenerateWorkflowParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("generate_gtm_workflow", &json!(p));

        let outcome = components::generate_workflow(
            &self.client,
            &p.account_id,
            &p.container_id,
            p.workflow_type,
            p.ga4_measurement_id.as_deref(),
            p.facebook_pixel_id.as_deref(),
        )
        .await;

        self.respond("generate_gtm_workflow", outcome)
    }

    // ========================================================================
    // Account Tools
    // ========================================================================

    #[tool(description = "List all GTM accounts accessible to the authenticated user")]
    async fn list_gtm_accounts(&self) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_accounts", &json!({}));

        let outcome = self.client.list_accounts().await;

        self.respond("list_gtm_accounts", outcome)
    }

    #[tool(description = "Get details of a GTM account")]
    async fn get_gtm_account(&self, Parameters(p): Parameters<AccountParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_account", &json!(p));

        let outcome = self.client.get_account(&p.account_id).await;

        self.respond("get_gtm_account", outcome)
    }

    #[tool(description = "Update a GTM account")]
    async fn update_gtm_account(&self, Parameters(p): Parameters<UpdateAccountParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_account", &json!(p));

        let outcome = self.client.update_account(&p.account_id, p.name, p.share_data).await;

        self.respond("update_gtm_account", outcome)
    }

    // ========================================================================
    // Container Tools
    // ========================================================================

    #[tool(description = "List all GTM containers for an account")]
    async fn list_gtm_containers(&self, Parameters(p): Parameters<AccountParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_containers", &json!(p));

        let outcome = self.client.list_containers(&p.account_id).await;

        self.respond("list_gtm_containers", outcome)
    }

    #[tool(description = "Get details of a GTM container")]
    async fn get_gtm_container(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_container", &json!(p));

        let outcome = self.client.get_container(&p.account_id, &p.container_id).await;

        self.respond("get_gtm_container", outcome)
    }

    #[tool(description = "Create a new GTM container")]
    async fn create_gtm_container(&self, Parameters(p): Parameters<CreateContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_container", &json!(p));

        let container = NewContainer {
            name: p.name,
            usage_context: p.usage_context.unwrap_or_default(),
            domain_name: p.domain_name,
            time_zone_country_id: p.time_zone_country_id,
            time_zone_id: p.time_zone_id,
            notes: p.notes,
        };
        let outcome = self.client.create_container(&p.account_id, container).await;

        self.respond("create_gtm_container", outcome)
    }

    #[tool(description = "Update a GTM container")]
    async fn update_gtm_container(&self, Parameters(p): Parameters<UpdateContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_container", &json!(p));

        let changes = ContainerChanges {
            name: p.name,
            domain_name: p.domain_name,
            time_zone_country_id: p.time_zone_country_id,
            time_zone_id: p.time_zone_id,
            notes: p.notes,
        };
        let outcome = self
            .client
            .update_container(&p.account_id, &p.container_id, changes)
            .await;

        self.respond("update_gtm_container", outcome)
    }

    #[tool(description = "Delete a GTM container")]
    async fn delete_gtm_container(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_container", &json!(p));

        let outcome = self.client.delete_container(&p.account_id, &p.container_id).await;

        self.respond("delete_gtm_container", outcome)
    }

    #[tool(description = "Get the JavaScript snippet for a container")]
    async fn get_gtm_container_snippet(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_container_snippet", &json!(p));

        let outcome = self.client.get_container_snippet(&p.account_id, &p.container_id).await;

        self.respond("get_gtm_container_snippet", outcome)
    }

    #[tool(description = "Look up a container by public ID")]
    async fn lookup_gtm_container(&self, Parameters(p): Parameters<LookupContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("lookup_gtm_container", &json!(p));

        let outcome = self
            .client
            .lookup_container(p.public_id.as_deref(), p.destination_id.as_deref())
            .await;

        self.respond("lookup_gtm_container", outcome)
    }

    #[tool(description = "Combine multiple containers")]
    async fn combine_gtm_containers(&self, Parameters(p): Parameters<CombineContainersParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("combine_gtm_containers", &json!(p));

        let outcome = self
            .client
            .combine_containers(
                &p.account_id,
                &p.container_id,
                &p.source_container_id,
                p.allow_user_variable_conflict,
            )
            .await;

        self.respond("combine_gtm_containers", outcome)
    }

    #[tool(description = "Move a tag ID from one container to another")]
    async fn move_gtm_tag_id(&self, Parameters(p): Parameters<MoveTagIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("move_gtm_tag_id", &json!(p));

        let outcome = self
            .client
            .move_tag_id(&p.account_id, &p.container_id, &p.tag_id, &p.destination_container_id)
            .await;

        self.respond("move_gtm_tag_id", outcome)
    }

    // ========================================================================
    // Workspace Tools
    // ========================================================================

    #[tool(description = "List all workspaces in a container")]
    async fn list_gtm_workspaces(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_workspaces", &json!(p));

        let outcome = self.client.list_workspaces(&p.account_id, &p.container_id).await;

        self.respond("list_gtm_workspaces", outcome)
    }

    #[tool(description = "Get details of a GTM workspace")]
    async fn get_gtm_workspace(&self, Parameters(p): Parameters<WorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .get_workspace(&p.account_id, &p.container_id, &p.workspace_id)
            .await;

        self.respond("get_gtm_workspace", outcome)
    }

    #[tool(description = "Create a new GTM workspace")]
    async fn create_gtm_workspace(&self, Parameters(p): Parameters<CreateWorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .create_workspace(&p.account_id, &p.container_id, &p.name, p.description.as_deref())
            .await;

        self.respond("create_gtm_workspace", outcome)
    }

    #[tool(description = "Update a GTM workspace")]
    async fn update_gtm_workspace(&self, Parameters(p): Parameters<UpdateWorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .update_workspace(&p.account_id, &p.container_id, &p.workspace_id, p.name, p.description)
            .await;

        self.respond("update_gtm_workspace", outcome)
    }

    #[tool(description = "Delete a GTM workspace")]
    async fn delete_gtm_workspace(&self, Parameters(p): Parameters<WorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .delete_workspace(&p.account_id, &p.container_id, &p.workspace_id)
            .await;

        self.respond("delete_gtm_workspace", outcome)
    }

    #[tool(description = "Get workspace status (changes and conflicts)")]
    async fn get_gtm_workspace_status(&self, Parameters(p): Parameters<WorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_workspace_status", &json!(p));

        let outcome = self
            .client
            .get_workspace_status(&p.account_id, &p.container_id, &p.workspace_id)
            .await;

        self.respond("get_gtm_workspace_status", outcome)
    }

    #[tool(description = "Sync workspace with latest container version")]
    async fn sync_gtm_workspace(&self, Parameters(p): Parameters<WorkspaceParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("sync_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .sync_workspace(&p.account_id, &p.container_id, &p.workspace_id)
            .await;

        self.respond("sync_gtm_workspace", outcome)
    }

    #[tool(description = "Resolve a merge conflict in workspace")]
    async fn resolve_gtm_conflict(&self, Parameters(p): Parameters<ResolveConflictParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("resolve_gtm_conflict", &json!(p));

        let outcome = self
            .client
            .resolve_conflict(&p.account_id, &p.container_id, &p.workspace_id, &p.conflict_id, p.change_type)
            .await;

        self.respond("resolve_gtm_conflict", outcome)
    }

    #[tool(description = "Perform bulk updates to multiple entities in workspace")]
    async fn bulk_update_gtm_workspace(&self, Parameters(p): Parameters<BulkUpdateParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("bulk_update_gtm_workspace", &json!(p));

        let changes = BulkChanges {
            tag: p.tag,
            trigger: p.trigger,
            variable: p.variable,
            folder: p.folder,
        };
        let outcome = self
            .client
            .bulk_update(&p.account_id, &p.container_id, &p.workspace_id, changes)
            .await;

        self.respond("bulk_update_gtm_workspace", outcome)
    }

    #[tool(description = "Create a quick preview URL for testing workspace changes")]
    async fn quick_preview_gtm_workspace(&self, Parameters(p): Parameters<QuickPreviewParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("quick_preview_gtm_workspace", &json!(p));

        let outcome = self
            .client
            .quick_preview(&p.account_id, &p.container_id, &p.url, p.workspace_id.as_deref())
            .await;

        self.respond("quick_preview_gtm_workspace", outcome)
    }

    // ========================================================================
    // Tag Tools
    // ========================================================================

    #[tool(description = "List all tags in a workspace")]
    async fn list_gtm_tags(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_tags", &json!(p));

        let outcome = self
            .client
            .list_tags(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_tags", outcome)
    }

    #[tool(description = "Get details of a GTM tag")]
    async fn get_gtm_tag(&self, Parameters(p): Parameters<TagIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_tag", &json!(p));

        let outcome = self
            .client
            .get_tag(&p.account_id, &p.container_id, &p.tag_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_tag", outcome)
    }

    #[tool(description = "Update a GTM tag")]
    async fn update_gtm_tag(&self, Parameters(p): Parameters<UpdateTagParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_tag", &json!(p));

        let changes = TagChanges {
            name: p.name,
            tag_type: p.tag_type,
            parameters: p.parameters,
            firing_trigger_id: p.firing_trigger_id,
            blocking_trigger_id: p.blocking_trigger_id,
            tag_firing_option: p.tag_firing_option,
        };
        let outcome = self
            .client
            .update_tag(&p.account_id, &p.container_id, &p.tag_id, changes, p.workspace_id.as_deref())
            .await;

        self.respond("update_gtm_tag", outcome)
    }

    #[tool(description = "Delete a GTM tag")]
    async fn delete_gtm_tag(&self, Parameters(p): Parameters<TagIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_tag", &json!(p));

        let outcome = self
            .client
            .delete_tag(&p.account_id, &p.container_id, &p.tag_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_tag", outcome)
    }

    #[tool(description = "Revert a GTM tag to its state in the latest published version")]
    async fn revert_gtm_tag(&self, Parameters(p): Parameters<TagIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_tag", &json!(p));

        let outcome = self
            .client
            .revert_tag(&p.account_id, &p.container_id, &p.tag_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_tag", outcome)
    }

    // ========================================================================
    // Trigger Tools
    // ========================================================================

    #[tool(description = "List all triggers in a workspace")]
    async fn list_gtm_triggers(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_triggers", &json!(p));

        let outcome = self
            .client
            .list_triggers(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_triggers", outcome)
    }

    #[tool(description = "Get details of a GTM trigger")]
    async fn get_gtm_trigger(&self, Parameters(p): Parameters<TriggerIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_trigger", &json!(p));

        let outcome = self
            .client
            .get_trigger(&p.account_id, &p.container_id, &p.trigger_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_trigger", outcome)
    }

    #[tool(description = "Update a GTM trigger")]
    async fn update_gtm_trigger(&self, Parameters(p): Parameters<UpdateTriggerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_trigger", &json!(p));

        let changes = TriggerChanges {
            name: p.name,
            trigger_type: p.trigger_type,
            conditions: p.conditions,
            wait_for_tags: p.wait_for_tags,
            wait_for_tags_timeout: p.wait_for_tags_timeout,
            check_validation: p.check_validation,
        };
        let outcome = self
            .client
            .update_trigger(&p.account_id, &p.container_id, &p.trigger_id, changes, p.workspace_id.as_deref())
            .await;

        self.respond("update_gtm_trigger", outcome)
    }

    #[tool(description = "Delete a GTM trigger")]
    async fn delete_gtm_trigger(&self, Parameters(p): Parameters<TriggerIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_trigger", &json!(p));

        let outcome = self
            .client
            .delete_trigger(&p.account_id, &p.container_id, &p.trigger_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_trigger", outcome)
    }

    #[tool(description = "Revert a GTM trigger to its state in the latest published version")]
    async fn revert_gtm_trigger(&self, Parameters(p): Parameters<TriggerIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_trigger", &json!(p));

        let outcome = self
            .client
            .revert_trigger(&p.account_id, &p.container_id, &p.trigger_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_trigger", outcome)
    }

    // ========================================================================
    // Variable Tools
    // ========================================================================

    #[tool(description = "List all variables in a workspace")]
    async fn list_gtm_variables(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_variables", &json!(p));

        let outcome = self
            .client
            .list_variables(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_variables", outcome)
    }

    #[tool(description = "Get details of a GTM variable")]
    async fn get_gtm_variable(&self, Parameters(p): Parameters<VariableIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_variable", &json!(p));

        let outcome = self
            .client
            .get_variable(&p.account_id, &p.container_id, &p.variable_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_variable", outcome)
    }

    #[tool(description = "Update a GTM variable")]
    async fn update_gtm_variable(&self, Parameters(p): Parameters<UpdateVariableParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_variable", &json!(p));

        let changes = VariableChanges {
            name: p.name,
            variable_type: p.variable_type,
            value: p.value,
        };
        let outcome = self
            .client
            .update_variable(&p.account_id, &p.container_id, &p.variable_id, changes, p.workspace_id.as_deref())
            .await;

        self.respond("update_gtm_variable", outcome)
    }

    #[tool(description = "Delete a GTM variable")]
    async fn delete_gtm_variable(&self, Parameters(p): Parameters<VariableIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_variable", &json!(p));

        let outcome = self
            .client
            .delete_variable(&p.account_id, &p.container_id, &p.variable_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_variable", outcome)
    }

    #[tool(description = "Revert a GTM variable to its state in the latest published version")]
    async fn revert_gtm_variable(&self, Parameters(p): Parameters<VariableIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_variable", &json!(p));

        let outcome = self
            .client
            .revert_variable(&p.account_id, &p.container_id, &p.variable_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_variable", outcome)
    }

    // ========================================================================
    // Folder Tools
    // ========================================================================

    #[tool(description = "List all folders in a workspace")]
    async fn list_gtm_folders(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_folders", &json!(p));

        let outcome = self
            .client
            .list_folders(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_folders", outcome)
    }

    #[tool(description = "Get details of a GTM folder")]
    async fn get_gtm_folder(&self, Parameters(p): Parameters<FolderIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_folder", &json!(p));

        let outcome = self
            .client
            .get_folder(&p.account_id, &p.container_id, &p.folder_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_folder", outcome)
    }

    #[tool(description = "Create a new GTM folder")]
    async fn create_gtm_folder(&self, Parameters(p): Parameters<CreateFolderParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_folder", &json!(p));

        let outcome = self
            .client
            .create_folder(&p.account_id, &p.container_id, &p.name, p.workspace_id.as_deref())
            .await;

        self.respond("create_gtm_folder", outcome)
    }

    #[tool(description = "Update a GTM folder")]
    async fn update_gtm_folder(&self, Parameters(p): Parameters<UpdateFolderParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_folder", &json!(p));

        let outcome = self
            .client
            .update_folder(&p.account_id, &p.container_id, &p.folder_id, &p.name, p.workspace_id.as_deref())
            .await;

        self.respond("update_gtm_folder", outcome)
    }

    #[tool(description = "Delete a GTM folder (must be empty)")]
    async fn delete_gtm_folder(&self, Parameters(p): Parameters<FolderIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_folder", &json!(p));

        let outcome = self
            .client
            .delete_folder(&p.account_id, &p.container_id, &p.folder_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_folder", outcome)
    }

    #[tool(description = "Revert a GTM folder to its state in the latest published version")]
    async fn revert_gtm_folder(&self, Parameters(p): Parameters<FolderIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_folder", &json!(p));

        let outcome = self
            .client
            .revert_folder(&p.account_id, &p.container_id, &p.folder_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_folder", outcome)
    }

    #[tool(description = "Move tags, triggers, or variables into a folder")]
    async fn move_entities_to_gtm_folder(
        &self,
        Parameters(p): Parameters<MoveEntitiesToFolderParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("move_entities_to_gtm_folder", &json!(p));

        let entities = FolderMove {
            tag_ids: p.tag_ids.unwrap_or_default(),
            trigger_ids: p.trigger_ids.unwrap_or_default(),
            variable_ids: p.variable_ids.unwrap_or_default(),
        };
        let outcome = self
            .client
            .move_entities_to_folder(&p.account_id, &p.container_id, &p.folder_id, entities, p.workspace_id.as_deref())
            .await;

        self.respond("move_entities_to_gtm_folder", outcome)
    }

    #[tool(description = "List all entities (tags, triggers, variables) in a folder")]
    async fn get_gtm_folder_entities(&self, Parameters(p): Parameters<FolderIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_folder_entities", &json!(p));

        let outcome = self
            .client
            .get_folder_entities(&p.account_id, &p.container_id, &p.folder_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_folder_entities", outcome)
    }

    // ========================================================================
    // Built-in Variable Tools
    // ========================================================================

    #[tool(description = "List all built-in variables in a workspace")]
    async fn list_gtm_built_in_variables(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_built_in_variables", &json!(p));

        let outcome = self
            .client
            .list_built_in_variables(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_built_in_variables", outcome)
    }

    #[tool(description = "Enable a built-in variable in workspace")]
    async fn create_gtm_built_in_variable(&self, Parameters(p): Parameters<BuiltInVariableParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_built_in_variable", &json!(p));

        let outcome = self
            .client
            .create_built_in_variable(&p.account_id, &p.container_id, &p.variable_type, p.workspace_id.as_deref())
            .await;

        self.respond("create_gtm_built_in_variable", outcome)
    }

    #[tool(description = "Disable a built-in variable in workspace")]
    async fn delete_gtm_built_in_variable(&self, Parameters(p): Parameters<BuiltInVariableParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_built_in_variable", &json!(p));

        let outcome = self
            .client
            .delete_built_in_variable(&p.account_id, &p.container_id, &p.variable_type, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_built_in_variable", outcome)
    }

    #[tool(description = "Revert built-in variables to their state in the latest published version")]
    async fn revert_gtm_built_in_variables(
        &self,
        Parameters(p): Parameters<RevertBuiltInVariablesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_built_in_variables", &json!(p));

        let outcome = self
            .client
            .revert_built_in_variables(
                &p.account_id,
                &p.container_id,
                p.variable_type.as_deref(),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("revert_gtm_built_in_variables", outcome)
    }

    // ========================================================================
    // Version Tools
    // ========================================================================

    #[tool(description = "List all versions of a container")]
    async fn list_gtm_versions(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_versions", &json!(p));

        let outcome = self.client.list_versions(&p.account_id, &p.container_id).await;

        self.respond("list_gtm_versions", outcome)
    }

    #[tool(description = "Get version details with all entities")]
    async fn get_gtm_version(&self, Parameters(p): Parameters<VersionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_version", &json!(p));

        let outcome = self
            .client
            .get_version(&p.account_id, &p.container_id, &p.version_id)
            .await;

        self.respond("get_gtm_version", outcome)
    }

    #[tool(description = "Update version metadata (name, description)")]
    async fn update_gtm_version(&self, Parameters(p): Parameters<UpdateVersionParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_version", &json!(p));

        let outcome = self
            .client
            .update_version(&p.account_id, &p.container_id, &p.version_id, p.name, p.description)
            .await;

        self.respond("update_gtm_version", outcome)
    }

    #[tool(description = "Delete a version (soft delete - can be undeleted)")]
    async fn delete_gtm_version(&self, Parameters(p): Parameters<VersionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_version", &json!(p));

        let outcome = self
            .client
            .delete_version(&p.account_id, &p.container_id, &p.version_id)
            .await;

        self.respond("delete_gtm_version", outcome)
    }

    #[tool(description = "Restore a deleted version")]
    async fn undelete_gtm_version(&self, Parameters(p): Parameters<VersionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("undelete_gtm_version", &json!(p));

        let outcome = self
            .client
            .undelete_version(&p.account_id, &p.container_id, &p.version_id)
            .await;

        self.respond("undelete_gtm_version", outcome)
    }

    #[tool(description = "Set a version as the latest (for preview purposes)")]
    async fn set_latest_gtm_version(&self, Parameters(p): Parameters<VersionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("set_latest_gtm_version", &json!(p));

        let outcome = self
            .client
            .set_latest_version(&p.account_id, &p.container_id, &p.version_id)
            .await;

        self.respond("set_latest_gtm_version", outcome)
    }

    #[tool(description = "Get the currently live (published) version")]
    async fn get_live_gtm_version(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_live_gtm_version", &json!(p));

        let outcome = self.client.get_live_version(&p.account_id, &p.container_id).await;

        self.respond("get_live_gtm_version", outcome)
    }

    #[tool(description = "List all version headers for a container (lightweight metadata)")]
    async fn list_gtm_version_headers(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_version_headers", &json!(p));

        let outcome = self.client.list_version_headers(&p.account_id, &p.container_id).await;

        self.respond("list_gtm_version_headers", outcome)
    }

    #[tool(description = "Get the latest version header")]
    async fn get_latest_gtm_version_header(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_latest_gtm_version_header", &json!(p));

        let outcome = self
            .client
            .get_latest_version_header(&p.account_id, &p.container_id)
            .await;

        self.respond("get_latest_gtm_version_header", outcome)
    }

    // ========================================================================
    // Environment Tools
    // ========================================================================

    #[tool(description = "List all environments for a container")]
    async fn list_gtm_environments(&self, Parameters(p): Parameters<ContainerParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_environments", &json!(p));

        let outcome = self.client.list_environments(&p.account_id, &p.container_id).await;

        self.respond("list_gtm_environments", outcome)
    }

    #[tool(description = "Get environment details")]
    async fn get_gtm_environment(&self, Parameters(p): Parameters<EnvironmentIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_environment", &json!(p));

        let outcome = self
            .client
            .get_environment(&p.account_id, &p.container_id, &p.environment_id)
            .await;

        self.respond("get_gtm_environment", outcome)
    }

    #[tool(description = "Create a new environment")]
    async fn create_gtm_environment(&self, Parameters(p): Parameters<CreateEnvironmentParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_environment", &json!(p));

        let environment = NewEnvironment {
            name: p.name,
            environment_type: p.environment_type,
            description: p.description,
            url: p.url,
        };
        let outcome = self
            .client
            .create_environment(&p.account_id, &p.container_id, environment)
            .await;

        self.respond("create_gtm_environment", outcome)
    }

    #[tool(description = "Update an environment")]
    async fn update_gtm_environment(&self, Parameters(p): Parameters<UpdateEnvironmentParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_environment", &json!(p));

        let changes = EnvironmentChanges {
            name: p.name,
            description: p.description,
            url: p.url,
        };
        let outcome = self
            .client
            .update_environment(&p.account_id, &p.container_id, &p.environment_id, changes)
            .await;

        self.respond("update_gtm_environment", outcome)
    }

    #[tool(description = "Delete an environment")]
    async fn delete_gtm_environment(&self, Parameters(p): Parameters<EnvironmentIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_environment", &json!(p));

        let outcome = self
            .client
            .delete_environment(&p.account_id, &p.container_id, &p.environment_id)
            .await;

        self.respond("delete_gtm_environment", outcome)
    }

    #[tool(description = "Reauthorize an environment (regenerate authorization code)")]
    async fn reauthorize_gtm_environment(&self, Parameters(p): Parameters<EnvironmentIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("reauthorize_gtm_environment", &json!(p));

        let outcome = self
            .client
            .reauthorize_environment(&p.account_id, &p.container_id, &p.environment_id)
            .await;

        self.respond("reauthorize_gtm_environment", outcome)
    }

    // ========================================================================
    // User Permission Tools
    // ========================================================================

    #[tool(description = "List all user permissions for an account")]
    async fn list_gtm_user_permissions(&self, Parameters(p): Parameters<AccountParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_user_permissions", &json!(p));

        let outcome = self.client.list_user_permissions(&p.account_id).await;

        self.respond("list_gtm_user_permissions", outcome)
    }

    #[tool(description = "Get user permission details")]
    async fn get_gtm_user_permission(&self, Parameters(p): Parameters<PermissionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_user_permission", &json!(p));

        let outcome = self
            .client
            .get_user_permission(&p.account_id, &p.permission_id)
            .await;

        self.respond("get_gtm_user_permission", outcome)
    }

    #[tool(description = "Create a new user permission (grant access)")]
    async fn create_gtm_user_permission(
        &self,
        Parameters(p): Parameters<CreateUserPermissionParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_user_permission", &json!(p));

        let outcome = self
            .client
            .create_user_permission(
                &p.account_id,
                &p.email_address,
                &p.account_access_permission,
                p.container_access.as_deref().unwrap_or(&[]),
            )
            .await;

        self.respond("create_gtm_user_permission", outcome)
    }

    #[tool(description = "Update a user permission")]
    async fn update_gtm_user_permission(
        &self,
        Parameters(p): Parameters<UpdateUserPermissionParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_user_permission", &json!(p));

        let outcome = self
            .client
            .update_user_permission(
                &p.account_id,
                &p.permission_id,
                p.account_access_permission.as_deref(),
                p.container_access.as_deref(),
            )
            .await;

        self.respond("update_gtm_user_permission", outcome)
    }

    #[tool(description = "Delete a user permission (revoke access)")]
    async fn delete_gtm_user_permission(&self, Parameters(p): Parameters<PermissionIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_user_permission", &json!(p));

        let outcome = self
            .client
            .delete_user_permission(&p.account_id, &p.permission_id)
            .await;

        self.respond("delete_gtm_user_permission", outcome)
    }

    // ========================================================================
    // Server-side Client Tools
    // ========================================================================

    #[tool(description = "List all clients in a workspace (Server-side Tagging)")]
    async fn list_gtm_clients(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_clients", &json!(p));

        let outcome = self
            .client
            .list_clients(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_clients", outcome)
    }

    #[tool(description = "Get client details (Server-side Tagging)")]
    async fn get_gtm_client(&self, Parameters(p): Parameters<ClientIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_client", &json!(p));

        let outcome = self
            .client
            .get_client(&p.account_id, &p.container_id, &p.client_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_client", outcome)
    }

    #[tool(description = "Create a new client (Server-side Tagging)")]
    async fn create_gtm_client(&self, Parameters(p): Parameters<CreateClientParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_client", &json!(p));

        let outcome = self
            .client
            .create_client(
                &p.account_id,
                &p.container_id,
                &p.name,
                &p.client_type,
                p.parameters.as_deref().unwrap_or(&[]),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("create_gtm_client", outcome)
    }

    #[tool(description = "Update a client (Server-side Tagging)")]
    async fn update_gtm_client(&self, Parameters(p): Parameters<UpdateClientParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_client", &json!(p));

        let outcome = self
            .client
            .update_client(
                &p.account_id,
                &p.container_id,
                &p.client_id,
                p.name,
                p.parameters.as_deref(),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("update_gtm_client", outcome)
    }

    #[tool(description = "Delete a client (Server-side Tagging)")]
    async fn delete_gtm_client(&self, Parameters(p): Parameters<ClientIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_client", &json!(p));

        let outcome = self
            .client
            .delete_client(&p.account_id, &p.container_id, &p.client_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_client", outcome)
    }

    #[tool(description = "Revert a client to its state in the latest published version (Server-side Tagging)")]
    async fn revert_gtm_client(&self, Parameters(p): Parameters<ClientIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_client", &json!(p));

        let outcome = self
            .client
            .revert_client(&p.account_id, &p.container_id, &p.client_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_client", outcome)
    }

    // ========================================================================
    // Google Tag Config Tools
    // ========================================================================

    #[tool(description = "List all Google Tag configs in a workspace")]
    async fn list_gtm_gtag_configs(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_gtag_configs", &json!(p));

        let outcome = self
            .client
            .list_gtag_configs(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_gtag_configs", outcome)
    }

    #[tool(description = "Get Google Tag config details")]
    async fn get_gtm_gtag_config(&self, Parameters(p): Parameters<GtagConfigIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_gtag_config", &json!(p));

        let outcome = self
            .client
            .get_gtag_config(&p.account_id, &p.container_id, &p.config_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_gtag_config", outcome)
    }

    #[tool(description = "Create a new Google Tag config")]
    async fn create_gtm_gtag_config(&self, Parameters(p): Parameters<CreateGtagConfigParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_gtag_config", &json!(p));

        let outcome = self
            .client
            .create_gtag_config(
                &p.account_id,
                &p.container_id,
                &p.tag_id,
                p.parameters.as_deref().unwrap_or(&[]),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("create_gtm_gtag_config", outcome)
    }

    #[tool(description = "Update a Google Tag config")]
    async fn update_gtm_gtag_config(&self, Parameters(p): Parameters<UpdateGtagConfigParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_gtag_config", &json!(p));

        let outcome = self
            .client
            .update_gtag_config(
                &p.account_id,
                &p.container_id,
                &p.config_id,
                p.tag_id,
                p.parameters.as_deref(),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("update_gtm_gtag_config", outcome)
    }

    #[tool(description = "Delete a Google Tag config")]
    async fn delete_gtm_gtag_config(&self, Parameters(p): Parameters<GtagConfigIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_gtag_config", &json!(p));

        let outcome = self
            .client
            .delete_gtag_config(&p.account_id, &p.container_id, &p.config_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_gtag_config", outcome)
    }

    #[tool(description = "Revert a Google Tag config to its state in the latest published version")]
    async fn revert_gtm_gtag_config(&self, Parameters(p): Parameters<GtagConfigIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_gtag_config", &json!(p));

        let outcome = self
            .client
            .revert_gtag_config(&p.account_id, &p.container_id, &p.config_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_gtag_config", outcome)
    }

    // ========================================================================
    // Template Tools
    // ========================================================================

    #[tool(description = "List all templates in a workspace")]
    async fn list_gtm_templates(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_templates", &json!(p));

        let outcome = self
            .client
            .list_templates(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_templates", outcome)
    }

    #[tool(description = "Get template details")]
    async fn get_gtm_template(&self, Parameters(p): Parameters<TemplateIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_template", &json!(p));

        let outcome = self
            .client
            .get_template(&p.account_id, &p.container_id, &p.template_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_template", outcome)
    }

    #[tool(description = "Create a new template")]
    async fn create_gtm_template(&self, Parameters(p): Parameters<CreateTemplateParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_template", &json!(p));

        let outcome = self
            .client
            .create_template(&p.account_id, &p.container_id, &p.name, &p.template_data, p.workspace_id.as_deref())
            .await;

        self.respond("create_gtm_template", outcome)
    }

    #[tool(description = "Update a template")]
    async fn update_gtm_template(&self, Parameters(p): Parameters<UpdateTemplateParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_template", &json!(p));

        let outcome = self
            .client
            .update_template(
                &p.account_id,
                &p.container_id,
                &p.template_id,
                p.name,
                p.template_data,
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("update_gtm_template", outcome)
    }

    #[tool(description = "Delete a template")]
    async fn delete_gtm_template(&self, Parameters(p): Parameters<TemplateIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_template", &json!(p));

        let outcome = self
            .client
            .delete_template(&p.account_id, &p.container_id, &p.template_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_template", outcome)
    }

    #[tool(description = "Revert a template to its state in the latest published version")]
    async fn revert_gtm_template(&self, Parameters(p): Parameters<TemplateIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_template", &json!(p));

        let outcome = self
            .client
            .revert_template(&p.account_id, &p.container_id, &p.template_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_template", outcome)
    }

    #[tool(description = "Import a template from the Community Template Gallery")]
    async fn import_gtm_template_from_gallery(
        &self,
        Parameters(p): Parameters<ImportTemplateParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("import_gtm_template_from_gallery", &json!(p));

        let outcome = self
            .client
            .import_template_from_gallery(
                &p.account_id,
                &p.container_id,
                &p.gallery_reference,
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("import_gtm_template_from_gallery", outcome)
    }

    // ========================================================================
    // Transformation Tools
    // ========================================================================

    #[tool(description = "List all transformations in a workspace (Server-side Tagging)")]
    async fn list_gtm_transformations(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_transformations", &json!(p));

        let outcome = self
            .client
            .list_transformations(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_transformations", outcome)
    }

    #[tool(description = "Get transformation details (Server-side Tagging)")]
    async fn get_gtm_transformation(&self, Parameters(p): Parameters<TransformationIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_transformation", &json!(p));

        let outcome = self
            .client
            .get_transformation(&p.account_id, &p.container_id, &p.transformation_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_transformation", outcome)
    }

    #[tool(description = "Create a new transformation (Server-side Tagging)")]
    async fn create_gtm_transformation(
        &self,
        Parameters(p): Parameters<CreateTransformationParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("create_gtm_transformation", &json!(p));

        let outcome = self
            .client
            .create_transformation(
                &p.account_id,
                &p.container_id,
                &p.name,
                &p.transformation_type,
                p.parameters.as_deref().unwrap_or(&[]),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("create_gtm_transformation", outcome)
    }

    #[tool(description = "Update a transformation (Server-side Tagging)")]
    async fn update_gtm_transformation(
        &self,
        Parameters(p): Parameters<UpdateTransformationParams>,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("update_gtm_transformation", &json!(p));

        let outcome = self
            .client
            .update_transformation(
                &p.account_id,
                &p.container_id,
                &p.transformation_id,
                p.name,
                p.parameters.as_deref(),
                p.workspace_id.as_deref(),
            )
            .await;

        self.respond("update_gtm_transformation", outcome)
    }

    #[tool(description = "Delete a transformation (Server-side Tagging)")]
    async fn delete_gtm_transformation(&self, Parameters(p): Parameters<TransformationIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("delete_gtm_transformation", &json!(p));

        let outcome = self
            .client
            .delete_transformation(&p.account_id, &p.container_id, &p.transformation_id, p.workspace_id.as_deref())
            .await;

        self.respond("delete_gtm_transformation", outcome)
    }

    #[tool(description = "Revert a transformation to its state in the latest published version (Server-side Tagging)")]
    async fn revert_gtm_transformation(&self, Parameters(p): Parameters<TransformationIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("revert_gtm_transformation", &json!(p));

        let outcome = self
            .client
            .revert_transformation(&p.account_id, &p.container_id, &p.transformation_id, p.workspace_id.as_deref())
            .await;

        self.respond("revert_gtm_transformation", outcome)
    }

    // ========================================================================
    // Zone Tools
    // ========================================================================

    #[tool(description = "List all zones in a workspace (Server-side Tagging)")]
    async fn list_gtm_zones(&self, Parameters(p): Parameters<WorkspaceScopeParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_gtm_zones", &json!(p));

        let outcome = self
            .client
            .list_zones(&p.account_id, &p.container_id, p.workspace_id.as_deref())
            .await;

        self.respond("list_gtm_zones", outcome)
    }

    #[tool(description = "Get zone details (Server-side Tagging)")]
    async fn get_gtm_zone(&self, Parameters(p): Parameters<ZoneIdParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("get_gtm_zone", &json!(p));

        let outcome = self
            .client
            .get_zone(&p.account_id, &p.container_id, &p.zone_id, p.workspace_id.as_deref())
            .await;

        self.respond("get_gtm_zone", outcome)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

impl ServerHandler for GtmServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Google Tag Manager MCP Server - Manage GTM accounts, containers, workspaces, \
                tags, triggers, variables, folders, versions, environments, user permissions, \
                templates and server-side entities, plus quick GA4, Facebook Pixel and form \
                tracking setups."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if let Some(rejected) = self.preflight(&request.name).await {
            return Ok(rejected);
        }

        let name = request.name.clone();
        let result = self.tool_router.call(ToolCallContext::new(self, request, context)).await;
        Ok(self.fold_error(&name, result))
    }
}
