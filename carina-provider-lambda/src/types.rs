//! Request and response shapes of the Lambda calls used by this provider
//!
//! These are plain data: save operations fill requests through value
//! setters, and the client maps them onto the AWS SDK.

use std::collections::HashMap;

// =============================================================================
// Alias
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasRequest {
    pub function_name: String,
    pub name: String,
    pub function_version: Option<String>,
    pub description: Option<String>,
    pub additional_version_weights: Option<HashMap<String, f64>>,
    pub revision_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasOutput {
    pub alias_arn: Option<String>,
    pub name: Option<String>,
    pub function_version: Option<String>,
    pub description: Option<String>,
    pub additional_version_weights: Option<HashMap<String, f64>>,
    pub revision_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionedConcurrencyRequest {
    pub function_name: String,
    pub qualifier: String,
    pub provisioned_concurrent_executions: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionedConcurrencyOutput {
    pub requested_provisioned_concurrent_executions: Option<i32>,
    pub allocated_provisioned_concurrent_executions: Option<i32>,
    pub status: Option<String>,
    pub last_modified: Option<String>,
}

/// Destination block shared by event source mappings and invoke configs
///
/// Sent whole; an empty block clears both destinations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Destinations {
    pub on_success: Option<String>,
    pub on_failure: Option<String>,
}

// =============================================================================
// Event Source Mapping
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSourceMappingRequest {
    /// Set for updates only
    pub uuid: Option<String>,
    pub function_name: Option<String>,
    pub event_source_arn: Option<String>,
    pub enabled: Option<bool>,
    pub batch_size: Option<i32>,
    pub maximum_batching_window_in_seconds: Option<i32>,
    pub parallelization_factor: Option<i32>,
    pub starting_position: Option<String>,
    pub maximum_record_age_in_seconds: Option<i32>,
    pub bisect_batch_on_function_error: Option<bool>,
    pub maximum_retry_attempts: Option<i32>,
    pub tumbling_window_in_seconds: Option<i32>,
    pub destination_config: Option<Destinations>,
    pub topics: Option<Vec<String>>,
    pub queues: Option<Vec<String>>,
    pub function_response_types: Option<Vec<String>>,
    pub filter_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSourceMappingOutput {
    pub uuid: Option<String>,
    pub event_source_mapping_arn: Option<String>,
    pub function_arn: Option<String>,
    pub event_source_arn: Option<String>,
    pub state: Option<String>,
    pub state_transition_reason: Option<String>,
    /// ISO-8601, as returned by the API
    pub last_modified: Option<String>,
    pub batch_size: Option<i32>,
    pub maximum_batching_window_in_seconds: Option<i32>,
    pub starting_position: Option<String>,
    pub maximum_retry_attempts: Option<i32>,
    pub on_failure_destination: Option<String>,
    pub topics: Option<Vec<String>>,
    pub queues: Option<Vec<String>>,
    pub function_response_types: Option<Vec<String>>,
    pub filter_patterns: Option<Vec<String>>,
}

// =============================================================================
// Event Invoke Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventInvokeConfigRequest {
    pub function_name: String,
    pub qualifier: Option<String>,
    pub maximum_retry_attempts: Option<i32>,
    pub maximum_event_age_in_seconds: Option<i32>,
    pub destination_config: Option<Destinations>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventInvokeConfigOutput {
    pub function_arn: Option<String>,
    pub last_modified: Option<String>,
    pub maximum_retry_attempts: Option<i32>,
    pub maximum_event_age_in_seconds: Option<i32>,
    pub on_success_destination: Option<String>,
    pub on_failure_destination: Option<String>,
}

// =============================================================================
// Function URL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cors {
    pub allow_credentials: Option<bool>,
    pub allow_headers: Option<Vec<String>>,
    pub allow_methods: Option<Vec<String>>,
    pub allow_origins: Option<Vec<String>>,
    pub expose_headers: Option<Vec<String>>,
    pub max_age: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionUrlRequest {
    pub function_name: String,
    pub qualifier: Option<String>,
    pub auth_type: Option<String>,
    pub invoke_mode: Option<String>,
    pub cors: Option<Cors>,
}

impl FunctionUrlRequest {
    pub fn cors_mut(&mut self) -> &mut Cors {
        self.cors.get_or_insert_with(Cors::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionUrlOutput {
    pub function_url: Option<String>,
    pub function_arn: Option<String>,
    pub auth_type: Option<String>,
    pub invoke_mode: Option<String>,
    pub cors: Option<Cors>,
    pub creation_time: Option<String>,
    pub last_modified_time: Option<String>,
}

// =============================================================================
// Version
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishVersionRequest {
    pub function_name: String,
    pub code_sha256: Option<String>,
    pub description: Option<String>,
    pub revision_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionOutput {
    pub function_name: Option<String>,
    pub function_arn: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub code_sha256: Option<String>,
    pub last_modified: Option<String>,
    pub state: Option<String>,
}

// =============================================================================
// Layer Version
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerVersionRequest {
    pub layer_name: String,
    pub description: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_key: Option<String>,
    pub s3_object_version: Option<String>,
    pub compatible_runtimes: Option<Vec<String>>,
    pub compatible_architectures: Option<Vec<String>>,
    pub license_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerVersionOutput {
    pub layer_arn: Option<String>,
    pub layer_version_arn: Option<String>,
    pub version: Option<i64>,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub compatible_runtimes: Option<Vec<String>>,
    pub compatible_architectures: Option<Vec<String>>,
    pub license_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPermissionRequest {
    pub layer_name: String,
    pub version_number: i64,
    pub statement_id: String,
    pub action: String,
    pub principal: String,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPermissionOutput {
    /// Policy statement as a JSON document
    pub statement: Option<String>,
    pub revision_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPolicyOutput {
    /// Full resource policy as a JSON document
    pub policy: Option<String>,
    pub revision_id: Option<String>,
}

// =============================================================================
// Code Signing Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeSigningConfigRequest {
    /// Set for updates only
    pub code_signing_config_arn: Option<String>,
    pub description: Option<String>,
    pub signing_profile_version_arns: Option<Vec<String>>,
    pub untrusted_artifact_on_deployment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeSigningConfigOutput {
    pub code_signing_config_arn: Option<String>,
    pub code_signing_config_id: Option<String>,
    pub description: Option<String>,
    pub signing_profile_version_arns: Option<Vec<String>>,
    pub untrusted_artifact_on_deployment: Option<String>,
    pub last_modified: Option<String>,
}
