//! Tool parameter structs. Field doc comments become the argument
//! descriptions in each tool's JSON schema.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::api::templates::GalleryReference;
use crate::api::user_permissions::ContainerAccess;
use crate::api::workspaces::ConflictChange;
use crate::api::server_side::Parameter;
use crate::components::WorkflowType;

// ============================================================================
// Shared scopes
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AccountParams {
    /// GTM account ID
    pub account_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ContainerParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
}

/// Workspace-scoped listing; the default workspace is used when omitted.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceScopeParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM workspace ID
    pub workspace_id: String,
}

/// Declares `{account_id, container_id, <id>, workspace_id?}` structs for
/// single-entity tools inside a workspace.
macro_rules! workspace_entity_params {
    ($($name:ident { $id:ident: $doc:literal })*) => {
        $(
            #[derive(Debug, Serialize, Deserialize, JsonSchema)]
            pub struct $name {
                /// GTM account ID
                pub account_id: String,
                /// GTM container ID
                pub container_id: String,
                #[doc = $doc]
                pub $id: String,
                /// GTM workspace ID (optional, uses default if not provided)
                pub workspace_id: Option<String>,
            }
        )*
    };
}

workspace_entity_params! {
    TagIdParams { tag_id: "GTM tag ID" }
    TriggerIdParams { trigger_id: "GTM trigger ID" }
    VariableIdParams { variable_id: "GTM variable ID" }
    FolderIdParams { folder_id: "GTM folder ID" }
    ClientIdParams { client_id: "GTM client ID" }
    GtagConfigIdParams { config_id: "GTM Google Tag Config ID" }
    TemplateIdParams { template_id: "GTM template ID" }
    TransformationIdParams { transformation_id: "GTM transformation ID" }
    ZoneIdParams { zone_id: "GTM zone ID" }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionIdParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM version ID
    pub version_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentIdParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM environment ID
    pub environment_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PermissionIdParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM user permission ID
    pub permission_id: String,
}

// ============================================================================
// Quick setup and publishing
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTagParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Name of the tag
    pub tag_name: String,
    /// Tag type (e.g., "gaawc", "awct", "ua")
    pub tag_type: String,
    /// Tag parameters
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTriggerParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Name of the trigger
    pub trigger_name: String,
    /// Trigger type (e.g., "click", "pageview")
    pub trigger_type: String,
    /// Trigger conditions
    pub conditions: Option<Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateVariableParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Name of the variable
    pub variable_name: String,
    /// Variable type (e.g., "c", "v", "jsm")
    pub variable_type: String,
    /// Variable value
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PublishVersionParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Version name
    pub name: Option<String>,
    /// Version notes
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Ga4SetupParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GA4 Measurement ID (e.g., G-XXXXXXXXXX)
    pub measurement_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FacebookPixelSetupParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Facebook Pixel ID
    pub pixel_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FormTrackingParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// CSS selector for the form (e.g., #contact-form)
    pub form_selector: String,
    /// Event name to fire (default: form_submit)
    pub event_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateWorkflowParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Type of workflow to generate
    pub workflow_type: WorkflowType,
    /// GA4 Measurement ID (optional)
    pub ga4_measurement_id: Option<String>,
    /// Facebook Pixel ID (optional)
    pub facebook_pixel_id: Option<String>,
}

// ============================================================================
// Accounts and containers
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateAccountParams {
    /// GTM account ID
    pub account_id: String,
    /// Account name
    pub name: Option<String>,
    /// Whether to share data anonymously
    pub share_data: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateContainerParams {
    /// GTM account ID
    pub account_id: String,
    /// Container name
    pub name: String,
    /// Usage contexts (web, android, ios, server)
    pub usage_context: Option<Vec<String>>,
    /// Domain names
    pub domain_name: Option<Vec<String>>,
    /// Timezone country ID
    pub time_zone_country_id: Option<String>,
    /// Timezone ID
    pub time_zone_id: Option<String>,
    /// Container notes
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateContainerParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Container name
    pub name: Option<String>,
    /// Domain names
    pub domain_name: Option<Vec<String>>,
    /// Timezone country ID
    pub time_zone_country_id: Option<String>,
    /// Timezone ID
    pub time_zone_id: Option<String>,
    /// Container notes
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LookupContainerParams {
    /// GTM account ID
    pub account_id: String,
    /// Public container ID (GTM-XXXXXXX)
    pub public_id: Option<String>,
    /// Destination ID for server-side containers
    pub destination_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CombineContainersParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID (destination)
    pub container_id: String,
    /// Source container ID to combine from
    pub source_container_id: String,
    /// Allow user variable conflicts
    pub allow_user_variable_conflict: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveTagIdParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID (source)
    pub container_id: String,
    /// Tag ID to move
    pub tag_id: String,
    /// Destination container ID
    pub destination_container_id: String,
}

// ============================================================================
// Workspaces
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWorkspaceParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Workspace name
    pub name: String,
    /// Workspace description
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateWorkspaceParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM workspace ID
    pub workspace_id: String,
    /// Workspace name
    pub name: Option<String>,
    /// Workspace description
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResolveConflictParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM workspace ID
    pub workspace_id: String,
    /// Conflict ID
    pub conflict_id: String,
    /// Change type to resolve conflict
    pub change_type: ConflictChange,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BulkUpdateParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM workspace ID
    pub workspace_id: String,
    /// Tag updates
    pub tag: Option<Vec<Value>>,
    /// Trigger updates
    pub trigger: Option<Vec<Value>>,
    /// Variable updates
    pub variable: Option<Vec<Value>>,
    /// Folder updates
    pub folder: Option<Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QuickPreviewParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// URL to preview
    pub url: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

// ============================================================================
// Tags, triggers, variables
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTagParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM tag ID
    pub tag_id: String,
    /// Tag name
    pub name: Option<String>,
    /// Tag type
    pub tag_type: Option<String>,
    /// Tag parameters
    pub parameters: Option<Map<String, Value>>,
    /// Firing trigger IDs
    pub firing_trigger_id: Option<Vec<String>>,
    /// Blocking trigger IDs
    pub blocking_trigger_id: Option<Vec<String>>,
    /// Tag firing option
    pub tag_firing_option: Option<String>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTriggerParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM trigger ID
    pub trigger_id: String,
    /// Trigger name
    pub name: Option<String>,
    /// Trigger type
    pub trigger_type: Option<String>,
    /// Trigger conditions
    pub conditions: Option<Vec<Value>>,
    /// Wait for tags
    pub wait_for_tags: Option<bool>,
    /// Wait for tags timeout (ms)
    pub wait_for_tags_timeout: Option<Number>,
    /// Check validation
    pub check_validation: Option<bool>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateVariableParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM variable ID
    pub variable_id: String,
    /// Variable name
    pub name: Option<String>,
    /// Variable type
    pub variable_type: Option<String>,
    /// Variable value
    pub value: Option<String>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

// ============================================================================
// Folders and built-in variables
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateFolderParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Folder name
    pub name: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateFolderParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM folder ID
    pub folder_id: String,
    /// Folder name
    pub name: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveEntitiesToFolderParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM folder ID
    pub folder_id: String,
    /// Array of tag IDs to move
    pub tag_ids: Option<Vec<String>>,
    /// Array of trigger IDs to move
    pub trigger_ids: Option<Vec<String>>,
    /// Array of variable IDs to move
    pub variable_ids: Option<Vec<String>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BuiltInVariableParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Built-in variable type (e.g., PAGE_URL, CLICK_ELEMENT)
    #[serde(rename = "type")]
    pub variable_type: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RevertBuiltInVariablesParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Built-in variable type to revert (optional, reverts all when omitted)
    #[serde(rename = "type")]
    pub variable_type: Option<String>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

// ============================================================================
// Versions and environments
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateVersionParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM version ID
    pub version_id: String,
    /// Version name
    pub name: Option<String>,
    /// Version description
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateEnvironmentParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Environment name
    pub name: String,
    /// Environment type (user, live, latest)
    #[serde(rename = "type")]
    pub environment_type: String,
    /// Environment description
    pub description: Option<String>,
    /// Environment URL (for preview environments)
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateEnvironmentParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM environment ID
    pub environment_id: String,
    /// Environment name
    pub name: Option<String>,
    /// Environment description
    pub description: Option<String>,
    /// Environment URL
    pub url: Option<String>,
}

// ============================================================================
// User permissions
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateUserPermissionParams {
    /// GTM account ID
    pub account_id: String,
    /// Email address of the user
    pub email_address: String,
    /// Account access permission (admin, user, noAccess)
    pub account_access_permission: String,
    /// Array of container access permissions
    pub container_access: Option<Vec<ContainerAccess>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateUserPermissionParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM user permission ID
    pub permission_id: String,
    /// Account access permission
    pub account_access_permission: Option<String>,
    /// Array of container access permissions
    pub container_access: Option<Vec<ContainerAccess>>,
}

// ============================================================================
// Server-side entities and templates
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateClientParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Client name
    pub name: String,
    /// Client type (e.g., GA4, UA, FIREBASE, CUSTOM)
    #[serde(rename = "type")]
    pub client_type: String,
    /// Client parameters (configuration)
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateClientParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM client ID
    pub client_id: String,
    /// Client name
    pub name: Option<String>,
    /// Client parameters
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateGtagConfigParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Google Tag ID (e.g., G-XXXXXXXXXX)
    pub tag_id: String,
    /// Configuration parameters
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateGtagConfigParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM Google Tag Config ID
    pub config_id: String,
    /// Google Tag ID
    pub tag_id: Option<String>,
    /// Configuration parameters
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTemplateParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Template name
    pub name: String,
    /// Template data (JSON string)
    pub template_data: String,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTemplateParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM template ID
    pub template_id: String,
    /// Template name
    pub name: Option<String>,
    /// Template data (JSON string)
    pub template_data: Option<String>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImportTemplateParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Gallery reference object
    pub gallery_reference: GalleryReference,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTransformationParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// Transformation name
    pub name: String,
    /// Transformation type (e.g., CUSTOM)
    #[serde(rename = "type")]
    pub transformation_type: String,
    /// Transformation parameters
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTransformationParams {
    /// GTM account ID
    pub account_id: String,
    /// GTM container ID
    pub container_id: String,
    /// GTM transformation ID
    pub transformation_id: String,
    /// Transformation name
    pub name: Option<String>,
    /// Transformation parameters
    pub parameters: Option<Vec<Parameter>>,
    /// GTM workspace ID (optional, uses default if not provided)
    pub workspace_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_workspace_may_be_omitted() {
        let params: TagIdParams = serde_json::from_value(json!({
            "account_id": "1",
            "container_id": "2",
            "tag_id": "3"
        }))
        .unwrap();
        assert_eq!(params.tag_id, "3");
        assert!(params.workspace_id.is_none());
    }

    #[test]
    fn test_type_argument_is_renamed() {
        let params: BuiltInVariableParams = serde_json::from_value(json!({
            "account_id": "1",
            "container_id": "2",
            "type": "PAGE_URL"
        }))
        .unwrap();
        assert_eq!(params.variable_type, "PAGE_URL");
    }

    #[test]
    fn test_workflow_type_rejects_unknown_profile() {
        let result = serde_json::from_value::<GenerateWorkflowParams>(json!({
            "account_id": "1",
            "container_id": "2",
            "workflow_type": "blog"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_container_access_entries() {
        let params: CreateUserPermissionParams = serde_json::from_value(json!({
            "account_id": "1",
            "email_address": "ana@example.com",
            "account_access_permission": "user",
            "container_access": [{"container_id": "2", "permission": "read"}]
        }))
        .unwrap();
        assert_eq!(params.container_access.unwrap()[0].container_id, "2");
    }

    #[test]
    fn test_trigger_timeout_keeps_integer_form() {
        let params: UpdateTriggerParams = serde_json::from_value(json!({
            "account_id": "1",
            "container_id": "2",
            "trigger_id": "5",
            "wait_for_tags_timeout": 2000
        }))
        .unwrap();
        assert_eq!(json!(params.wait_for_tags_timeout).to_string(), "2000");
    }
}
