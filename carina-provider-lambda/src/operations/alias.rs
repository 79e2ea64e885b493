//! Alias operations, plus the provisioned concurrency operations that aliases
//! and versions share

use std::collections::HashMap;

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, Path, ProviderError, ProviderResult, ResourceAction, SaveContext, SaveOperation,
    SaveResult, Setters, Value, extract,
};
use log::debug;

use super::{Source, deleted, not_prepared, remote_failure, returned_id, touched};
use crate::api::LambdaClient;
use crate::types::{AliasOutput, AliasRequest, ProvisionedConcurrencyRequest};

const CREATE: &str = "create alias";
const UPDATE: &str = "update alias";
const DELETE: &str = "delete alias";
const READ: &str = "get alias";
const PUT_CONCURRENCY: &str = "put provisioned concurrency";
const DELETE_CONCURRENCY: &str = "delete provisioned concurrency";

const ROUTING_WEIGHTS: &str = "$.routingConfig.additionalVersionWeights";
const PROVISIONED_CONCURRENCY: &str = "$.provisionedConcurrencyConfig";
const PROVISIONED_EXECUTIONS: &str =
    "$.provisionedConcurrencyConfig.provisionedConcurrentExecutions";

fn setters() -> Setters<AliasRequest> {
    Setters::<AliasRequest>::new()
        .string("$.functionVersion", |r, v| r.function_version = Some(v))
        .string("$.description", |r, v| r.description = Some(v))
        .float_map(ROUTING_WEIGHTS, |r, v| {
            r.additional_version_weights = Some(v)
        })
}

fn addressed(tree: &Value, operation: &'static str) -> ProviderResult<AliasRequest> {
    Ok(AliasRequest {
        function_name: extract::require_string(tree, "$.functionName", operation)?,
        name: extract::require_string(tree, "$.name", operation)?,
        ..Default::default()
    })
}

fn record(ctx: &mut SaveContext, out: &AliasOutput) {
    ctx.insert_opt("aliasArn", out.alias_arn.clone());
    ctx.insert_opt("revisionId", out.revision_id.clone());
}

// =============================================================================
// Alias
// =============================================================================

#[derive(Default)]
pub struct CreateAlias {
    request: Option<AliasRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for CreateAlias {
    fn name(&self) -> &'static str {
        CREATE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = addressed(tree, CREATE)?;
        extract::require_string(tree, "$.functionVersion", CREATE)?;
        setters().try_apply(tree, &mut request, CREATE)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, CREATE);
        };
        let out = match client.create_alias(&request).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, CREATE, err),
        };
        let (mut ctx, arn) = returned_id(ctx, CREATE, out.alias_arn.as_deref(), "alias ARN")?;
        record(&mut ctx, &out);
        ctx.set_upstream_id(arn);
        Ok(ctx)
    }
}

/// Applies only the alias fields the change set touches
#[derive(Default)]
pub struct UpdateAlias {
    request: Option<AliasRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for UpdateAlias {
    fn name(&self) -> &'static str {
        UPDATE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = addressed(tree, UPDATE)?;
        let mut applicable = setters().try_apply_changed(tree, &mut request, changes, UPDATE)?;

        // Removing the routing config means shifting all traffic back
        if touched(changes, ROUTING_WEIGHTS) && request.additional_version_weights.is_none() {
            request.additional_version_weights = Some(HashMap::new());
            applicable = true;
        }
        if !applicable {
            return Ok(false);
        }

        request.revision_id = ctx.get_str("revisionId").map(str::to_string);
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, UPDATE);
        };
        let out = match client.update_alias(&request).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, UPDATE, err),
        };
        let (mut ctx, arn) = returned_id(ctx, UPDATE, out.alias_arn.as_deref(), "alias ARN")?;
        record(&mut ctx, &out);
        ctx.set_upstream_id(arn);
        Ok(ctx)
    }
}

#[derive(Default)]
pub struct DeleteAlias {
    request: Option<AliasRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteAlias {
    fn name(&self) -> &'static str {
        DELETE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.request = Some(addressed(tree, DELETE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, DELETE);
        };
        let result = client
            .delete_alias(&request.function_name, &request.name)
            .await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadAlias {
    request: Option<AliasRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadAlias {
    fn name(&self) -> &'static str {
        READ
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.request = Some(addressed(tree, READ)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, READ);
        };
        let out = match client.get_alias(&request.function_name, &request.name).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };
        let (mut ctx, arn) = returned_id(ctx, READ, out.alias_arn.as_deref(), "alias ARN")?;
        ctx.insert("functionName", request.function_name);
        ctx.insert("name", request.name);
        ctx.insert_opt("functionVersion", out.function_version.clone());
        ctx.insert_opt("description", out.description.clone());
        if let Some(weights) = out.additional_version_weights.clone() {
            ctx.insert(
                "routingConfig",
                Value::from_iter([("additionalVersionWeights", Value::from(weights))]),
            );
        }
        record(&mut ctx, &out);
        ctx.set_upstream_id(arn);
        Ok(ctx)
    }
}

// =============================================================================
// Provisioned concurrency
// =============================================================================

/// Puts provisioned concurrency on an alias or version
///
/// On create, applicable when the tree configures provisioned concurrency.
/// On update, additionally requires the change set to touch it.
pub struct PutProvisionedConcurrency {
    action: ResourceAction,
    qualifier: Source,
    request: Option<ProvisionedConcurrencyRequest>,
}

impl PutProvisionedConcurrency {
    pub fn new(action: ResourceAction, qualifier: Source) -> Self {
        Self {
            action,
            qualifier,
            request: None,
        }
    }
}

#[async_trait]
impl SaveOperation<LambdaClient> for PutProvisionedConcurrency {
    fn name(&self) -> &'static str {
        PUT_CONCURRENCY
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        if self.action == ResourceAction::Update && !touched(changes, PROVISIONED_CONCURRENCY) {
            debug!("{}: provisioned concurrency unchanged", PUT_CONCURRENCY);
            return Ok(false);
        }

        let Some(executions) = Path::literal(PROVISIONED_EXECUTIONS).resolve(tree) else {
            return Ok(false);
        };
        extract::fits_i32(executions).map_err(|message| {
            ProviderError::invalid_value(
                PUT_CONCURRENCY,
                format!("{}: {}", PROVISIONED_EXECUTIONS, message),
            )
        })?;

        self.request = Some(ProvisionedConcurrencyRequest {
            function_name: extract::require_string(tree, "$.functionName", PUT_CONCURRENCY)?,
            qualifier: self.qualifier.resolve(ctx, tree, PUT_CONCURRENCY)?,
            provisioned_concurrent_executions: extract::int32(executions),
        });
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, PUT_CONCURRENCY);
        };
        match client.put_provisioned_concurrency_config(&request).await {
            Ok(out) => {
                debug!(
                    "{}: {}:{} status {}",
                    PUT_CONCURRENCY,
                    request.function_name,
                    request.qualifier,
                    out.status.as_deref().unwrap_or("unknown")
                );
                Ok(ctx)
            }
            Err(err) => remote_failure(ctx, PUT_CONCURRENCY, err),
        }
    }
}

/// Removes provisioned concurrency when an update drops it from the tree
pub struct DeleteProvisionedConcurrency {
    qualifier: Source,
    target: Option<(String, String)>,
}

impl DeleteProvisionedConcurrency {
    pub fn new(qualifier: Source) -> Self {
        Self {
            qualifier,
            target: None,
        }
    }
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteProvisionedConcurrency {
    fn name(&self) -> &'static str {
        DELETE_CONCURRENCY
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let still_configured = Path::literal(PROVISIONED_EXECUTIONS).resolve(tree).is_some();
        if !touched(changes, PROVISIONED_CONCURRENCY) || still_configured {
            return Ok(false);
        }

        self.target = Some((
            extract::require_string(tree, "$.functionName", DELETE_CONCURRENCY)?,
            self.qualifier.resolve(ctx, tree, DELETE_CONCURRENCY)?,
        ));
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((function_name, qualifier)) = self.target.take() else {
            return not_prepared(ctx, DELETE_CONCURRENCY);
        };
        let result = client
            .delete_provisioned_concurrency_config(&function_name, &qualifier)
            .await;
        deleted(ctx, DELETE_CONCURRENCY, result)
    }
}
