//! `LambdaApi` implementation backed by the AWS SDK

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lambda::Client;
use aws_sdk_lambda::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_lambda::primitives::{DateTime, DateTimeFormat};
use aws_sdk_lambda::types as sdk;
use log::debug;

use crate::api::{ApiError, ApiResult, LambdaApi};
use crate::config::ProviderConfig;
use crate::types::*;

/// AWS Lambda client
#[derive(Debug, Clone)]
pub struct AwsLambdaClient {
    client: Client,
}

impl AwsLambdaClient {
    /// Create a client for the configured region and endpoint
    pub async fn from_config(config: &ProviderConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_lambda::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            debug!("Using Lambda endpoint {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wrap an existing SDK client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

// =============================================================================
// Error and value conversion
// =============================================================================

fn api_error<E, R>(err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some("ResourceNotFoundException") => ApiError::NotFound(message),
        Some("InvalidParameterValueException") | Some("ResourceConflictException") => {
            ApiError::InvalidRequest(message)
        }
        _ => ApiError::Service(message),
    }
}

fn timestamp(value: Option<DateTime>) -> Option<String> {
    value.and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
}

fn enums<T: for<'a> From<&'a str>>(values: &Option<Vec<String>>) -> Option<Vec<T>> {
    values
        .as_ref()
        .map(|v| v.iter().map(|s| T::from(s.as_str())).collect())
}

fn routing_config(weights: &Option<HashMap<String, f64>>) -> Option<sdk::AliasRoutingConfiguration> {
    weights.as_ref().map(|w| {
        sdk::AliasRoutingConfiguration::builder()
            .set_additional_version_weights(Some(w.clone()))
            .build()
    })
}

/// The block replaces the remote one whole; `OnFailure` is always sent so an
/// empty block clears the remote destinations.
fn destination_config(destinations: &Option<Destinations>) -> Option<sdk::DestinationConfig> {
    destinations.as_ref().map(|d| {
        sdk::DestinationConfig::builder()
            .set_on_success(
                d.on_success
                    .as_ref()
                    .map(|arn| sdk::OnSuccess::builder().destination(arn).build()),
            )
            .on_failure(
                sdk::OnFailure::builder()
                    .set_destination(d.on_failure.clone())
                    .build(),
            )
            .build()
    })
}

fn sdk_cors(cors: &Cors) -> sdk::Cors {
    sdk::Cors::builder()
        .set_allow_credentials(cors.allow_credentials)
        .set_allow_headers(cors.allow_headers.clone())
        .set_allow_methods(cors.allow_methods.clone())
        .set_allow_origins(cors.allow_origins.clone())
        .set_expose_headers(cors.expose_headers.clone())
        .set_max_age(cors.max_age)
        .build()
}

fn cors_output(cors: sdk::Cors) -> Cors {
    Cors {
        allow_credentials: cors.allow_credentials,
        allow_headers: cors.allow_headers,
        allow_methods: cors.allow_methods,
        allow_origins: cors.allow_origins,
        expose_headers: cors.expose_headers,
        max_age: cors.max_age,
    }
}

fn code_signing_config_output(config: Option<sdk::CodeSigningConfig>) -> CodeSigningConfigOutput {
    let Some(config) = config else {
        return CodeSigningConfigOutput::default();
    };
    let publishers: Option<sdk::AllowedPublishers> = config.allowed_publishers.into();
    let policies: Option<sdk::CodeSigningPolicies> = config.code_signing_policies.into();
    CodeSigningConfigOutput {
        code_signing_config_arn: config.code_signing_config_arn.into(),
        code_signing_config_id: config.code_signing_config_id.into(),
        description: config.description.into(),
        signing_profile_version_arns: publishers
            .and_then(|p| Option::<Vec<String>>::from(p.signing_profile_version_arns)),
        untrusted_artifact_on_deployment: policies
            .and_then(|p| p.untrusted_artifact_on_deployment)
            .map(|p| p.as_str().to_string()),
        last_modified: config.last_modified.into(),
    }
}

// Create, update and get return distinct SDK types with the same fields.

macro_rules! alias_output {
    ($out:expr) => {{
        let out = $out;
        AliasOutput {
            alias_arn: out.alias_arn,
            name: out.name,
            function_version: out.function_version,
            description: out.description,
            additional_version_weights: out
                .routing_config
                .and_then(|r| r.additional_version_weights),
            revision_id: out.revision_id,
        }
    }};
}

macro_rules! event_source_mapping_output {
    ($out:expr) => {{
        let out = $out;
        EventSourceMappingOutput {
            uuid: out.uuid,
            event_source_mapping_arn: out.event_source_mapping_arn,
            function_arn: out.function_arn,
            event_source_arn: out.event_source_arn,
            state: out.state,
            state_transition_reason: out.state_transition_reason,
            last_modified: timestamp(out.last_modified),
            batch_size: out.batch_size,
            maximum_batching_window_in_seconds: out.maximum_batching_window_in_seconds,
            starting_position: out.starting_position.map(|p| p.as_str().to_string()),
            maximum_retry_attempts: out.maximum_retry_attempts,
            on_failure_destination: out
                .destination_config
                .and_then(|d| d.on_failure)
                .and_then(|f| f.destination),
            topics: out.topics,
            queues: out.queues,
            function_response_types: out
                .function_response_types
                .map(|t| t.iter().map(|r| r.as_str().to_string()).collect()),
            filter_patterns: out
                .filter_criteria
                .and_then(|c| c.filters)
                .map(|filters| filters.into_iter().filter_map(|f| f.pattern).collect()),
        }
    }};
}

macro_rules! event_invoke_config_output {
    ($out:expr) => {{
        let out = $out;
        let destination = out.destination_config;
        EventInvokeConfigOutput {
            function_arn: out.function_arn,
            last_modified: timestamp(out.last_modified),
            maximum_retry_attempts: out.maximum_retry_attempts,
            maximum_event_age_in_seconds: out.maximum_event_age_in_seconds,
            on_success_destination: destination
                .as_ref()
                .and_then(|d| d.on_success.as_ref())
                .and_then(|s| s.destination.clone()),
            on_failure_destination: destination
                .and_then(|d| d.on_failure)
                .and_then(|f| f.destination),
        }
    }};
}

macro_rules! function_url_output {
    ($out:expr, $last_modified:expr) => {{
        let out = $out;
        let auth_type: Option<sdk::FunctionUrlAuthType> = out.auth_type.into();
        FunctionUrlOutput {
            function_url: out.function_url.into(),
            function_arn: out.function_arn.into(),
            auth_type: auth_type.map(|a| a.as_str().to_string()),
            invoke_mode: out.invoke_mode.map(|m| m.as_str().to_string()),
            cors: out.cors.map(cors_output),
            creation_time: out.creation_time.into(),
            last_modified_time: $last_modified,
        }
    }};
}

macro_rules! version_output {
    ($out:expr) => {{
        let out = $out;
        VersionOutput {
            function_name: out.function_name,
            function_arn: out.function_arn,
            version: out.version,
            description: out.description,
            code_sha256: out.code_sha256,
            last_modified: out.last_modified,
            state: out.state.map(|s| s.as_str().to_string()),
        }
    }};
}

macro_rules! layer_version_output {
    ($out:expr) => {{
        let out = $out;
        LayerVersionOutput {
            layer_arn: out.layer_arn,
            layer_version_arn: out.layer_version_arn,
            version: out.version.into(),
            description: out.description,
            created_date: out.created_date,
            compatible_runtimes: out
                .compatible_runtimes
                .map(|r| r.iter().map(|v| v.as_str().to_string()).collect()),
            compatible_architectures: out
                .compatible_architectures
                .map(|a| a.iter().map(|v| v.as_str().to_string()).collect()),
            license_info: out.license_info,
        }
    }};
}

fn allowed_publishers(
    request: &CodeSigningConfigRequest,
) -> ApiResult<Option<sdk::AllowedPublishers>> {
    request
        .signing_profile_version_arns
        .as_ref()
        .map(|arns| {
            sdk::AllowedPublishers::builder()
                .set_signing_profile_version_arns(Some(arns.clone()))
                .build()
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))
        })
        .transpose()
}

fn code_signing_policies(request: &CodeSigningConfigRequest) -> Option<sdk::CodeSigningPolicies> {
    request.untrusted_artifact_on_deployment.as_ref().map(|p| {
        sdk::CodeSigningPolicies::builder()
            .untrusted_artifact_on_deployment(sdk::CodeSigningPolicy::from(p.as_str()))
            .build()
    })
}

fn filter_criteria(patterns: &Option<Vec<String>>) -> Option<sdk::FilterCriteria> {
    patterns.as_ref().map(|patterns| {
        sdk::FilterCriteria::builder()
            .set_filters(Some(
                patterns
                    .iter()
                    .map(|p| sdk::Filter::builder().pattern(p).build())
                    .collect(),
            ))
            .build()
    })
}

// =============================================================================
// LambdaApi
// =============================================================================

#[async_trait]
impl LambdaApi for AwsLambdaClient {
    async fn create_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput> {
        let out = self
            .client
            .create_alias()
            .function_name(&request.function_name)
            .name(&request.name)
            .set_function_version(request.function_version.clone())
            .set_description(request.description.clone())
            .set_routing_config(routing_config(&request.additional_version_weights))
            .send()
            .await
            .map_err(api_error)?;
        Ok(alias_output!(out))
    }

    async fn update_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput> {
        let out = self
            .client
            .update_alias()
            .function_name(&request.function_name)
            .name(&request.name)
            .set_function_version(request.function_version.clone())
            .set_description(request.description.clone())
            .set_routing_config(routing_config(&request.additional_version_weights))
            .set_revision_id(request.revision_id.clone())
            .send()
            .await
            .map_err(api_error)?;
        Ok(alias_output!(out))
    }

    async fn get_alias(&self, function_name: &str, name: &str) -> ApiResult<AliasOutput> {
        let out = self
            .client
            .get_alias()
            .function_name(function_name)
            .name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(alias_output!(out))
    }

    async fn delete_alias(&self, function_name: &str, name: &str) -> ApiResult<()> {
        self.client
            .delete_alias()
            .function_name(function_name)
            .name(name)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn put_provisioned_concurrency_config(
        &self,
        request: &ProvisionedConcurrencyRequest,
    ) -> ApiResult<ProvisionedConcurrencyOutput> {
        let out = self
            .client
            .put_provisioned_concurrency_config()
            .function_name(&request.function_name)
            .qualifier(&request.qualifier)
            .provisioned_concurrent_executions(request.provisioned_concurrent_executions)
            .send()
            .await
            .map_err(api_error)?;
        Ok(ProvisionedConcurrencyOutput {
            requested_provisioned_concurrent_executions: out
                .requested_provisioned_concurrent_executions,
            allocated_provisioned_concurrent_executions: out
                .allocated_provisioned_concurrent_executions,
            status: out.status.map(|s| s.as_str().to_string()),
            last_modified: out.last_modified,
        })
    }

    async fn delete_provisioned_concurrency_config(
        &self,
        function_name: &str,
        qualifier: &str,
    ) -> ApiResult<()> {
        self.client
            .delete_provisioned_concurrency_config()
            .function_name(function_name)
            .qualifier(qualifier)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn create_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput> {
        let out = self
            .client
            .create_event_source_mapping()
            .set_function_name(request.function_name.clone())
            .set_event_source_arn(request.event_source_arn.clone())
            .set_enabled(request.enabled)
            .set_batch_size(request.batch_size)
            .set_maximum_batching_window_in_seconds(request.maximum_batching_window_in_seconds)
            .set_parallelization_factor(request.parallelization_factor)
            .set_starting_position(
                request
                    .starting_position
                    .as_deref()
                    .map(sdk::EventSourcePosition::from),
            )
            .set_maximum_record_age_in_seconds(request.maximum_record_age_in_seconds)
            .set_bisect_batch_on_function_error(request.bisect_batch_on_function_error)
            .set_maximum_retry_attempts(request.maximum_retry_attempts)
            .set_tumbling_window_in_seconds(request.tumbling_window_in_seconds)
            .set_destination_config(destination_config(&request.destination_config))
            .set_topics(request.topics.clone())
            .set_queues(request.queues.clone())
            .set_function_response_types(enums(&request.function_response_types))
            .set_filter_criteria(filter_criteria(&request.filter_patterns))
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_source_mapping_output!(out))
    }

    async fn update_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput> {
        let uuid = request
            .uuid
            .as_deref()
            .ok_or_else(|| ApiError::InvalidRequest("event source mapping uuid".to_string()))?;
        let out = self
            .client
            .update_event_source_mapping()
            .uuid(uuid)
            .set_function_name(request.function_name.clone())
            .set_enabled(request.enabled)
            .set_batch_size(request.batch_size)
            .set_maximum_batching_window_in_seconds(request.maximum_batching_window_in_seconds)
            .set_parallelization_factor(request.parallelization_factor)
            .set_maximum_record_age_in_seconds(request.maximum_record_age_in_seconds)
            .set_bisect_batch_on_function_error(request.bisect_batch_on_function_error)
            .set_maximum_retry_attempts(request.maximum_retry_attempts)
            .set_tumbling_window_in_seconds(request.tumbling_window_in_seconds)
            .set_destination_config(destination_config(&request.destination_config))
            .set_function_response_types(enums(&request.function_response_types))
            .set_filter_criteria(filter_criteria(&request.filter_patterns))
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_source_mapping_output!(out))
    }

    async fn get_event_source_mapping(&self, uuid: &str) -> ApiResult<EventSourceMappingOutput> {
        let out = self
            .client
            .get_event_source_mapping()
            .uuid(uuid)
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_source_mapping_output!(out))
    }

    async fn delete_event_source_mapping(&self, uuid: &str) -> ApiResult<()> {
        self.client
            .delete_event_source_mapping()
            .uuid(uuid)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn put_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput> {
        let out = self
            .client
            .put_function_event_invoke_config()
            .function_name(&request.function_name)
            .set_qualifier(request.qualifier.clone())
            .set_maximum_retry_attempts(request.maximum_retry_attempts)
            .set_maximum_event_age_in_seconds(request.maximum_event_age_in_seconds)
            .set_destination_config(destination_config(&request.destination_config))
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_invoke_config_output!(out))
    }

    async fn update_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput> {
        let out = self
            .client
            .update_function_event_invoke_config()
            .function_name(&request.function_name)
            .set_qualifier(request.qualifier.clone())
            .set_maximum_retry_attempts(request.maximum_retry_attempts)
            .set_maximum_event_age_in_seconds(request.maximum_event_age_in_seconds)
            .set_destination_config(destination_config(&request.destination_config))
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_invoke_config_output!(out))
    }

    async fn get_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<EventInvokeConfigOutput> {
        let out = self
            .client
            .get_function_event_invoke_config()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        Ok(event_invoke_config_output!(out))
    }

    async fn delete_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()> {
        self.client
            .delete_function_event_invoke_config()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn create_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput> {
        let out = self
            .client
            .create_function_url_config()
            .function_name(&request.function_name)
            .set_qualifier(request.qualifier.clone())
            .set_auth_type(
                request
                    .auth_type
                    .as_deref()
                    .map(sdk::FunctionUrlAuthType::from),
            )
            .set_invoke_mode(request.invoke_mode.as_deref().map(sdk::InvokeMode::from))
            .set_cors(request.cors.as_ref().map(sdk_cors))
            .send()
            .await
            .map_err(api_error)?;
        Ok(function_url_output!(out, None))
    }

    async fn update_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput> {
        let out = self
            .client
            .update_function_url_config()
            .function_name(&request.function_name)
            .set_qualifier(request.qualifier.clone())
            .set_auth_type(
                request
                    .auth_type
                    .as_deref()
                    .map(sdk::FunctionUrlAuthType::from),
            )
            .set_invoke_mode(request.invoke_mode.as_deref().map(sdk::InvokeMode::from))
            .set_cors(request.cors.as_ref().map(sdk_cors))
            .send()
            .await
            .map_err(api_error)?;
        let last_modified: Option<String> = out.last_modified_time.clone().into();
        Ok(function_url_output!(out, last_modified))
    }

    async fn get_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<FunctionUrlOutput> {
        let out = self
            .client
            .get_function_url_config()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        let last_modified: Option<String> = out.last_modified_time.clone().into();
        Ok(function_url_output!(out, last_modified))
    }

    async fn delete_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()> {
        self.client
            .delete_function_url_config()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn publish_version(&self, request: &PublishVersionRequest) -> ApiResult<VersionOutput> {
        let out = self
            .client
            .publish_version()
            .function_name(&request.function_name)
            .set_code_sha256(request.code_sha256.clone())
            .set_description(request.description.clone())
            .set_revision_id(request.revision_id.clone())
            .send()
            .await
            .map_err(api_error)?;
        Ok(version_output!(out))
    }

    async fn get_function_configuration(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<VersionOutput> {
        let out = self
            .client
            .get_function_configuration()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        Ok(version_output!(out))
    }

    async fn delete_function(&self, function_name: &str, qualifier: Option<&str>) -> ApiResult<()> {
        self.client
            .delete_function()
            .function_name(function_name)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn publish_layer_version(
        &self,
        request: &LayerVersionRequest,
    ) -> ApiResult<LayerVersionOutput> {
        let content = sdk::LayerVersionContentInput::builder()
            .set_s3_bucket(request.s3_bucket.clone())
            .set_s3_key(request.s3_key.clone())
            .set_s3_object_version(request.s3_object_version.clone())
            .build();
        let out = self
            .client
            .publish_layer_version()
            .layer_name(&request.layer_name)
            .set_description(request.description.clone())
            .content(content)
            .set_compatible_runtimes(enums(&request.compatible_runtimes))
            .set_compatible_architectures(enums(&request.compatible_architectures))
            .set_license_info(request.license_info.clone())
            .send()
            .await
            .map_err(api_error)?;
        Ok(layer_version_output!(out))
    }

    async fn get_layer_version(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerVersionOutput> {
        let out = self
            .client
            .get_layer_version()
            .layer_name(layer_name)
            .version_number(version_number)
            .send()
            .await
            .map_err(api_error)?;
        Ok(layer_version_output!(out))
    }

    async fn delete_layer_version(&self, layer_name: &str, version_number: i64) -> ApiResult<()> {
        self.client
            .delete_layer_version()
            .layer_name(layer_name)
            .version_number(version_number)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn add_layer_version_permission(
        &self,
        request: &LayerPermissionRequest,
    ) -> ApiResult<LayerPermissionOutput> {
        let out = self
            .client
            .add_layer_version_permission()
            .layer_name(&request.layer_name)
            .version_number(request.version_number)
            .statement_id(&request.statement_id)
            .action(&request.action)
            .principal(&request.principal)
            .set_organization_id(request.organization_id.clone())
            .send()
            .await
            .map_err(api_error)?;
        Ok(LayerPermissionOutput {
            statement: out.statement,
            revision_id: out.revision_id,
        })
    }

    async fn get_layer_version_policy(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerPolicyOutput> {
        let out = self
            .client
            .get_layer_version_policy()
            .layer_name(layer_name)
            .version_number(version_number)
            .send()
            .await
            .map_err(api_error)?;
        Ok(LayerPolicyOutput {
            policy: out.policy,
            revision_id: out.revision_id,
        })
    }

    async fn remove_layer_version_permission(
        &self,
        layer_name: &str,
        version_number: i64,
        statement_id: &str,
    ) -> ApiResult<()> {
        self.client
            .remove_layer_version_permission()
            .layer_name(layer_name)
            .version_number(version_number)
            .statement_id(statement_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn create_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput> {
        let out = self
            .client
            .create_code_signing_config()
            .set_description(request.description.clone())
            .set_allowed_publishers(allowed_publishers(request)?)
            .set_code_signing_policies(code_signing_policies(request))
            .send()
            .await
            .map_err(api_error)?;
        Ok(code_signing_config_output(out.code_signing_config.into()))
    }

    async fn update_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput> {
        let arn = request
            .code_signing_config_arn
            .as_deref()
            .ok_or_else(|| ApiError::InvalidRequest("code signing config arn".to_string()))?;
        let out = self
            .client
            .update_code_signing_config()
            .code_signing_config_arn(arn)
            .set_description(request.description.clone())
            .set_allowed_publishers(allowed_publishers(request)?)
            .set_code_signing_policies(code_signing_policies(request))
            .send()
            .await
            .map_err(api_error)?;
        Ok(code_signing_config_output(out.code_signing_config.into()))
    }

    async fn get_code_signing_config(&self, arn: &str) -> ApiResult<CodeSigningConfigOutput> {
        let out = self
            .client
            .get_code_signing_config()
            .code_signing_config_arn(arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(code_signing_config_output(out.code_signing_config.into()))
    }

    async fn delete_code_signing_config(&self, arn: &str) -> ApiResult<()> {
        self.client
            .delete_code_signing_config()
            .code_signing_config_arn(arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &HashMap<String, String>) -> ApiResult<()> {
        self.client
            .tag_resource()
            .resource(arn)
            .set_tags(Some(tags.clone()))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        self.client
            .untag_resource()
            .resource(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn list_tags(&self, arn: &str) -> ApiResult<HashMap<String, String>> {
        let out = self
            .client
            .list_tags()
            .resource(arn)
            .send()
            .await
            .map_err(api_error)?;
        Ok(out.tags.unwrap_or_default())
    }
}
