//! Lambda client capability
//!
//! Save operations call into [`LambdaApi`] rather than the SDK client so
//! that sequences can run against a stub in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::*;

/// Error returned by a single Lambda call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service error: {0}")]
    Service(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client handle the save operations are generic over
pub type LambdaClient = dyn LambdaApi;

/// The Lambda calls the provider's save operations need
#[async_trait]
pub trait LambdaApi: Send + Sync {
    // Alias
    async fn create_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput>;
    async fn update_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput>;
    async fn get_alias(&self, function_name: &str, name: &str) -> ApiResult<AliasOutput>;
    async fn delete_alias(&self, function_name: &str, name: &str) -> ApiResult<()>;

    // Provisioned concurrency
    async fn put_provisioned_concurrency_config(
        &self,
        request: &ProvisionedConcurrencyRequest,
    ) -> ApiResult<ProvisionedConcurrencyOutput>;
    async fn delete_provisioned_concurrency_config(
        &self,
        function_name: &str,
        qualifier: &str,
    ) -> ApiResult<()>;

    // Event source mapping
    async fn create_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput>;
    async fn update_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput>;
    async fn get_event_source_mapping(&self, uuid: &str) -> ApiResult<EventSourceMappingOutput>;
    async fn delete_event_source_mapping(&self, uuid: &str) -> ApiResult<()>;

    // Event invoke config
    async fn put_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput>;
    async fn update_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput>;
    async fn get_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<EventInvokeConfigOutput>;
    async fn delete_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()>;

    // Function URL
    async fn create_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput>;
    async fn update_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput>;
    async fn get_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<FunctionUrlOutput>;
    async fn delete_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()>;

    // Version
    async fn publish_version(&self, request: &PublishVersionRequest) -> ApiResult<VersionOutput>;
    async fn get_function_configuration(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<VersionOutput>;
    async fn delete_function(&self, function_name: &str, qualifier: Option<&str>) -> ApiResult<()>;

    // Layer version
    async fn publish_layer_version(
        &self,
        request: &LayerVersionRequest,
    ) -> ApiResult<LayerVersionOutput>;
    async fn get_layer_version(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerVersionOutput>;
    async fn delete_layer_version(&self, layer_name: &str, version_number: i64) -> ApiResult<()>;

    // Layer version permission
    async fn add_layer_version_permission(
        &self,
        request: &LayerPermissionRequest,
    ) -> ApiResult<LayerPermissionOutput>;
    async fn get_layer_version_policy(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerPolicyOutput>;
    async fn remove_layer_version_permission(
        &self,
        layer_name: &str,
        version_number: i64,
        statement_id: &str,
    ) -> ApiResult<()>;

    // Code signing config
    async fn create_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput>;
    async fn update_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput>;
    async fn get_code_signing_config(&self, arn: &str) -> ApiResult<CodeSigningConfigOutput>;
    async fn delete_code_signing_config(&self, arn: &str) -> ApiResult<()>;

    // Tags
    async fn tag_resource(&self, arn: &str, tags: &HashMap<String, String>) -> ApiResult<()>;
    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()>;
    async fn list_tags(&self, arn: &str) -> ApiResult<HashMap<String, String>>;
}
