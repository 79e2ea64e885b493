//! Recording in-memory `LambdaApi` for tests

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, ApiResult, LambdaApi};
use crate::types::*;

const ACCOUNT_PREFIX: &str = "arn:aws:lambda:us-east-1:123456789012";
const TIMESTAMP: &str = "2024-01-01T00:00:00.000+0000";

type Recorded = (&'static str, Box<dyn Any + Send>);

/// Stub Lambda client
///
/// Answers every call with a plausible response derived from the request,
/// records calls in order, and can be told to fail or report not-found for
/// specific calls.
#[derive(Default)]
pub struct StubLambda {
    calls: Mutex<Vec<Recorded>>,
    failing: HashSet<&'static str>,
    missing: HashSet<&'static str>,
    tags: Mutex<HashMap<String, HashMap<String, String>>>,
    mapping_target: Option<String>,
}

impl StubLambda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `call` fail with a service error
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    /// Make `call` fail with not-found
    pub fn missing(mut self, call: &'static str) -> Self {
        self.missing.insert(call);
        self
    }

    /// Make `get_event_source_mapping` report `function_arn` as its target
    pub fn mapping_target(mut self, function_arn: &str) -> Self {
        self.mapping_target = Some(function_arn.to_string());
        self
    }

    /// Names of the calls received, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(name, _)| *name).collect()
    }

    /// Last request received by `call`
    pub fn last<T: Clone + 'static>(&self, call: &str) -> Option<T> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(name, _)| *name == call)
            .find_map(|(_, request)| request.downcast_ref::<T>().cloned())
    }

    /// Tags currently attached to `arn`
    pub fn tags_of(&self, arn: &str) -> HashMap<String, String> {
        self.tags.lock().unwrap().get(arn).cloned().unwrap_or_default()
    }

    fn enter<T: Any + Send>(&self, call: &'static str, request: T) -> ApiResult<()> {
        self.calls.lock().unwrap().push((call, Box::new(request)));
        if self.missing.contains(call) {
            return Err(ApiError::NotFound(format!("{} target does not exist", call)));
        }
        if self.failing.contains(call) {
            return Err(ApiError::Service(format!("{} failed", call)));
        }
        Ok(())
    }
}

fn function_arn(function_name: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("{}:function:{}:{}", ACCOUNT_PREFIX, function_name, q),
        None => format!("{}:function:{}", ACCOUNT_PREFIX, function_name),
    }
}

fn alias(request: &AliasRequest) -> AliasOutput {
    AliasOutput {
        alias_arn: Some(function_arn(&request.function_name, Some(&request.name))),
        name: Some(request.name.clone()),
        function_version: request.function_version.clone(),
        description: request.description.clone(),
        additional_version_weights: request.additional_version_weights.clone(),
        revision_id: Some("rev-1".to_string()),
    }
}

fn event_source_mapping(
    request: &EventSourceMappingRequest,
    state: &str,
) -> EventSourceMappingOutput {
    let uuid = request.uuid.clone().unwrap_or_else(|| "uuid-1".to_string());
    EventSourceMappingOutput {
        event_source_mapping_arn: Some(format!("{}:event-source-mapping:{}", ACCOUNT_PREFIX, uuid)),
        uuid: Some(uuid),
        function_arn: request
            .function_name
            .as_deref()
            .map(|f| function_arn(f, None)),
        event_source_arn: request.event_source_arn.clone(),
        state: Some(state.to_string()),
        state_transition_reason: Some("USER_INITIATED".to_string()),
        last_modified: Some("2024-01-01T00:00:00Z".to_string()),
        batch_size: request.batch_size,
        maximum_batching_window_in_seconds: request.maximum_batching_window_in_seconds,
        starting_position: request.starting_position.clone(),
        maximum_retry_attempts: request.maximum_retry_attempts,
        on_failure_destination: request
            .destination_config
            .as_ref()
            .and_then(|d| d.on_failure.clone()),
        topics: request.topics.clone(),
        queues: request.queues.clone(),
        function_response_types: request.function_response_types.clone(),
        filter_patterns: request.filter_patterns.clone(),
    }
}

fn event_invoke_config(request: &EventInvokeConfigRequest) -> EventInvokeConfigOutput {
    EventInvokeConfigOutput {
        function_arn: Some(function_arn(
            &request.function_name,
            Some(request.qualifier.as_deref().unwrap_or("$LATEST")),
        )),
        last_modified: Some("2024-01-01T00:00:00Z".to_string()),
        maximum_retry_attempts: request.maximum_retry_attempts,
        maximum_event_age_in_seconds: request.maximum_event_age_in_seconds,
        on_success_destination: request
            .destination_config
            .as_ref()
            .and_then(|d| d.on_success.clone()),
        on_failure_destination: request
            .destination_config
            .as_ref()
            .and_then(|d| d.on_failure.clone()),
    }
}

fn function_url(request: &FunctionUrlRequest, last_modified: Option<&str>) -> FunctionUrlOutput {
    FunctionUrlOutput {
        function_url: Some(format!(
            "https://{}.lambda-url.us-east-1.on.aws/",
            request.function_name
        )),
        function_arn: Some(function_arn(
            &request.function_name,
            request.qualifier.as_deref(),
        )),
        auth_type: request.auth_type.clone(),
        invoke_mode: request.invoke_mode.clone(),
        cors: request.cors.clone(),
        creation_time: Some(TIMESTAMP.to_string()),
        last_modified_time: last_modified.map(str::to_string),
    }
}

fn layer_version(layer_name: &str, version: i64, description: Option<String>) -> LayerVersionOutput {
    let layer_arn = format!("{}:layer:{}", ACCOUNT_PREFIX, layer_name);
    LayerVersionOutput {
        layer_version_arn: Some(format!("{}:{}", layer_arn, version)),
        layer_arn: Some(layer_arn),
        version: Some(version),
        description,
        created_date: Some(TIMESTAMP.to_string()),
        compatible_runtimes: Some(vec!["python3.12".to_string()]),
        compatible_architectures: None,
        license_info: None,
    }
}

fn code_signing_config(request: &CodeSigningConfigRequest) -> CodeSigningConfigOutput {
    CodeSigningConfigOutput {
        code_signing_config_arn: Some(
            request
                .code_signing_config_arn
                .clone()
                .unwrap_or_else(|| format!("{}:code-signing-config:csc-1", ACCOUNT_PREFIX)),
        ),
        code_signing_config_id: Some("csc-1".to_string()),
        description: request.description.clone(),
        signing_profile_version_arns: request.signing_profile_version_arns.clone(),
        untrusted_artifact_on_deployment: request.untrusted_artifact_on_deployment.clone(),
        last_modified: Some(TIMESTAMP.to_string()),
    }
}

#[async_trait]
impl LambdaApi for StubLambda {
    async fn create_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput> {
        self.enter("create_alias", request.clone())?;
        Ok(alias(request))
    }

    async fn update_alias(&self, request: &AliasRequest) -> ApiResult<AliasOutput> {
        self.enter("update_alias", request.clone())?;
        Ok(AliasOutput {
            revision_id: Some("rev-2".to_string()),
            ..alias(request)
        })
    }

    async fn get_alias(&self, function_name: &str, name: &str) -> ApiResult<AliasOutput> {
        self.enter("get_alias", (function_name.to_string(), name.to_string()))?;
        Ok(alias(&AliasRequest {
            function_name: function_name.to_string(),
            name: name.to_string(),
            function_version: Some("1".to_string()),
            ..Default::default()
        }))
    }

    async fn delete_alias(&self, function_name: &str, name: &str) -> ApiResult<()> {
        self.enter("delete_alias", (function_name.to_string(), name.to_string()))
    }

    async fn put_provisioned_concurrency_config(
        &self,
        request: &ProvisionedConcurrencyRequest,
    ) -> ApiResult<ProvisionedConcurrencyOutput> {
        self.enter("put_provisioned_concurrency_config", request.clone())?;
        Ok(ProvisionedConcurrencyOutput {
            requested_provisioned_concurrent_executions: Some(
                request.provisioned_concurrent_executions,
            ),
            allocated_provisioned_concurrent_executions: Some(0),
            status: Some("IN_PROGRESS".to_string()),
            last_modified: Some(TIMESTAMP.to_string()),
        })
    }

    async fn delete_provisioned_concurrency_config(
        &self,
        function_name: &str,
        qualifier: &str,
    ) -> ApiResult<()> {
        self.enter(
            "delete_provisioned_concurrency_config",
            (function_name.to_string(), qualifier.to_string()),
        )
    }

    async fn create_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput> {
        self.enter("create_event_source_mapping", request.clone())?;
        Ok(event_source_mapping(request, "Creating"))
    }

    async fn update_event_source_mapping(
        &self,
        request: &EventSourceMappingRequest,
    ) -> ApiResult<EventSourceMappingOutput> {
        self.enter("update_event_source_mapping", request.clone())?;
        Ok(event_source_mapping(request, "Updating"))
    }

    async fn get_event_source_mapping(&self, uuid: &str) -> ApiResult<EventSourceMappingOutput> {
        self.enter("get_event_source_mapping", uuid.to_string())?;
        let mut out = event_source_mapping(
            &EventSourceMappingRequest {
                uuid: Some(uuid.to_string()),
                function_name: Some("f".to_string()),
                event_source_arn: Some("arn:aws:sqs:us-east-1:123456789012:orders".to_string()),
                batch_size: Some(10),
                ..Default::default()
            },
            "Enabled",
        );
        if let Some(arn) = &self.mapping_target {
            out.function_arn = Some(arn.clone());
        }
        Ok(out)
    }

    async fn delete_event_source_mapping(&self, uuid: &str) -> ApiResult<()> {
        self.enter("delete_event_source_mapping", uuid.to_string())
    }

    async fn put_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput> {
        self.enter("put_function_event_invoke_config", request.clone())?;
        Ok(event_invoke_config(request))
    }

    async fn update_function_event_invoke_config(
        &self,
        request: &EventInvokeConfigRequest,
    ) -> ApiResult<EventInvokeConfigOutput> {
        self.enter("update_function_event_invoke_config", request.clone())?;
        Ok(event_invoke_config(request))
    }

    async fn get_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<EventInvokeConfigOutput> {
        self.enter(
            "get_function_event_invoke_config",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )?;
        Ok(event_invoke_config(&EventInvokeConfigRequest {
            function_name: function_name.to_string(),
            qualifier: qualifier.map(str::to_string),
            maximum_retry_attempts: Some(1),
            ..Default::default()
        }))
    }

    async fn delete_function_event_invoke_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()> {
        self.enter(
            "delete_function_event_invoke_config",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )
    }

    async fn create_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput> {
        self.enter("create_function_url_config", request.clone())?;
        Ok(function_url(request, None))
    }

    async fn update_function_url_config(
        &self,
        request: &FunctionUrlRequest,
    ) -> ApiResult<FunctionUrlOutput> {
        self.enter("update_function_url_config", request.clone())?;
        Ok(function_url(request, Some("2024-02-01T00:00:00.000+0000")))
    }

    async fn get_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<FunctionUrlOutput> {
        self.enter(
            "get_function_url_config",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )?;
        Ok(function_url(
            &FunctionUrlRequest {
                function_name: function_name.to_string(),
                qualifier: qualifier.map(str::to_string),
                auth_type: Some("NONE".to_string()),
                ..Default::default()
            },
            Some(TIMESTAMP),
        ))
    }

    async fn delete_function_url_config(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<()> {
        self.enter(
            "delete_function_url_config",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )
    }

    async fn publish_version(&self, request: &PublishVersionRequest) -> ApiResult<VersionOutput> {
        self.enter("publish_version", request.clone())?;
        Ok(VersionOutput {
            function_name: Some(request.function_name.clone()),
            function_arn: Some(function_arn(&request.function_name, Some("3"))),
            version: Some("3".to_string()),
            description: request.description.clone(),
            code_sha256: request.code_sha256.clone(),
            last_modified: Some(TIMESTAMP.to_string()),
            state: Some("Pending".to_string()),
        })
    }

    async fn get_function_configuration(
        &self,
        function_name: &str,
        qualifier: Option<&str>,
    ) -> ApiResult<VersionOutput> {
        self.enter(
            "get_function_configuration",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )?;
        Ok(VersionOutput {
            function_name: Some(function_name.to_string()),
            function_arn: Some(function_arn(function_name, qualifier)),
            version: qualifier.map(str::to_string),
            description: None,
            code_sha256: Some("abc=".to_string()),
            last_modified: Some(TIMESTAMP.to_string()),
            state: Some("Active".to_string()),
        })
    }

    async fn delete_function(&self, function_name: &str, qualifier: Option<&str>) -> ApiResult<()> {
        self.enter(
            "delete_function",
            (function_name.to_string(), qualifier.map(str::to_string)),
        )
    }

    async fn publish_layer_version(
        &self,
        request: &LayerVersionRequest,
    ) -> ApiResult<LayerVersionOutput> {
        self.enter("publish_layer_version", request.clone())?;
        Ok(layer_version(
            &request.layer_name,
            1,
            request.description.clone(),
        ))
    }

    async fn get_layer_version(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerVersionOutput> {
        self.enter("get_layer_version", (layer_name.to_string(), version_number))?;
        Ok(layer_version(layer_name, version_number, None))
    }

    async fn delete_layer_version(&self, layer_name: &str, version_number: i64) -> ApiResult<()> {
        self.enter("delete_layer_version", (layer_name.to_string(), version_number))
    }

    async fn add_layer_version_permission(
        &self,
        request: &LayerPermissionRequest,
    ) -> ApiResult<LayerPermissionOutput> {
        self.enter("add_layer_version_permission", request.clone())?;
        Ok(LayerPermissionOutput {
            statement: Some(format!(
                r#"{{"Sid":"{}","Effect":"Allow","Principal":"{}","Action":"{}"}}"#,
                request.statement_id, request.principal, request.action
            )),
            revision_id: Some("rev-1".to_string()),
        })
    }

    async fn get_layer_version_policy(
        &self,
        layer_name: &str,
        version_number: i64,
    ) -> ApiResult<LayerPolicyOutput> {
        self.enter(
            "get_layer_version_policy",
            (layer_name.to_string(), version_number),
        )?;
        Ok(LayerPolicyOutput {
            policy: Some(
                r#"{"Version":"2012-10-17","Statement":[{"Sid":"share","Effect":"Allow","Principal":"*","Action":"lambda:GetLayerVersion"}]}"#
                    .to_string(),
            ),
            revision_id: Some("rev-1".to_string()),
        })
    }

    async fn remove_layer_version_permission(
        &self,
        layer_name: &str,
        version_number: i64,
        statement_id: &str,
    ) -> ApiResult<()> {
        self.enter(
            "remove_layer_version_permission",
            (layer_name.to_string(), version_number, statement_id.to_string()),
        )
    }

    async fn create_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput> {
        self.enter("create_code_signing_config", request.clone())?;
        Ok(code_signing_config(request))
    }

    async fn update_code_signing_config(
        &self,
        request: &CodeSigningConfigRequest,
    ) -> ApiResult<CodeSigningConfigOutput> {
        self.enter("update_code_signing_config", request.clone())?;
        Ok(code_signing_config(request))
    }

    async fn get_code_signing_config(&self, arn: &str) -> ApiResult<CodeSigningConfigOutput> {
        self.enter("get_code_signing_config", arn.to_string())?;
        Ok(code_signing_config(&CodeSigningConfigRequest {
            code_signing_config_arn: Some(arn.to_string()),
            signing_profile_version_arns: Some(vec!["arn:aws:signer:profile/1".to_string()]),
            ..Default::default()
        }))
    }

    async fn delete_code_signing_config(&self, arn: &str) -> ApiResult<()> {
        self.enter("delete_code_signing_config", arn.to_string())
    }

    async fn tag_resource(&self, arn: &str, tags: &HashMap<String, String>) -> ApiResult<()> {
        self.enter("tag_resource", (arn.to_string(), tags.clone()))?;
        self.tags
            .lock()
            .unwrap()
            .entry(arn.to_string())
            .or_default()
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        self.enter("untag_resource", (arn.to_string(), keys.to_vec()))?;
        if let Some(tags) = self.tags.lock().unwrap().get_mut(arn) {
            for key in keys {
                tags.remove(key);
            }
        }
        Ok(())
    }

    async fn list_tags(&self, arn: &str) -> ApiResult<HashMap<String, String>> {
        self.enter("list_tags", arn.to_string())?;
        Ok(self.tags_of(arn))
    }
}
