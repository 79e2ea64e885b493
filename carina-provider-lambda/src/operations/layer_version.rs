//! Layer version operations
//!
//! Layer versions are immutable: there is no update, a changed layer is
//! published again.

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderError, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters,
    Value, extract,
};
use log::info;

use super::{deleted, not_prepared, remote_failure, returned_id};
use crate::api::LambdaClient;
use crate::types::{LayerVersionOutput, LayerVersionRequest};

const PUBLISH: &str = "publish layer version";
const DELETE: &str = "delete layer version";
const READ: &str = "get layer version";

fn setters() -> Setters<LayerVersionRequest> {
    Setters::<LayerVersionRequest>::new()
        .string("$.description", |r, v| r.description = Some(v))
        .string("$.content.s3Bucket", |r, v| r.s3_bucket = Some(v))
        .string("$.content.s3Key", |r, v| r.s3_key = Some(v))
        .string("$.content.s3ObjectVersion", |r, v| {
            r.s3_object_version = Some(v)
        })
        .strings("$.compatibleRuntimes", |r, v| {
            r.compatible_runtimes = Some(v)
        })
        .strings("$.compatibleArchitectures", |r, v| {
            r.compatible_architectures = Some(v)
        })
        .string("$.licenseInfo", |r, v| r.license_info = Some(v))
}

/// Version number recorded in the context by publish, or restored from state
pub(crate) fn version_number(ctx: &SaveContext, operation: &'static str) -> ProviderResult<i64> {
    match ctx.get("version") {
        Some(Value::Int(n)) => Ok(*n),
        Some(Value::String(s)) => s.parse().map_err(|_| {
            ProviderError::invalid_value(operation, format!("layer version is not a number: {}", s))
        }),
        _ => Err(ProviderError::missing_context(operation, "version")),
    }
}

fn addressed(
    ctx: &SaveContext,
    tree: &Value,
    operation: &'static str,
) -> ProviderResult<(String, i64)> {
    Ok((
        extract::require_string(tree, "$.layerName", operation)?,
        version_number(ctx, operation)?,
    ))
}

fn recorded(ctx: SaveContext, operation: &'static str, out: LayerVersionOutput) -> SaveResult {
    let (mut ctx, arn) = returned_id(
        ctx,
        operation,
        out.layer_version_arn.as_deref(),
        "layer version ARN",
    )?;
    ctx.insert("layerVersionArn", arn.clone());
    ctx.insert_opt("layerArn", out.layer_arn);
    ctx.insert_opt("version", out.version);
    ctx.insert_opt("createdDate", out.created_date);
    ctx.set_upstream_id(arn);
    Ok(ctx)
}

#[derive(Default)]
pub struct PublishLayerVersion {
    request: Option<LayerVersionRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for PublishLayerVersion {
    fn name(&self) -> &'static str {
        PUBLISH
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = LayerVersionRequest {
            layer_name: extract::require_string(tree, "$.layerName", PUBLISH)?,
            ..Default::default()
        };
        extract::require_string(tree, "$.content.s3Bucket", PUBLISH)?;
        extract::require_string(tree, "$.content.s3Key", PUBLISH)?;
        setters().try_apply(tree, &mut request, PUBLISH)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, PUBLISH);
        };
        match client.publish_layer_version(&request).await {
            Ok(out) => {
                info!(
                    "Published layer {} version {}",
                    request.layer_name,
                    out.version.unwrap_or_default()
                );
                recorded(ctx, PUBLISH, out)
            }
            Err(err) => remote_failure(ctx, PUBLISH, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteLayerVersion {
    target: Option<(String, i64)>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteLayerVersion {
    fn name(&self) -> &'static str {
        DELETE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.target = Some(addressed(ctx, tree, DELETE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((layer_name, version)) = self.target.take() else {
            return not_prepared(ctx, DELETE);
        };
        let result = client.delete_layer_version(&layer_name, version).await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadLayerVersion {
    target: Option<(String, i64)>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadLayerVersion {
    fn name(&self) -> &'static str {
        READ
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.target = Some(addressed(ctx, tree, READ)?);
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((layer_name, version)) = self.target.take() else {
            return not_prepared(ctx, READ);
        };
        let mut out = match client.get_layer_version(&layer_name, version).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        ctx.insert("layerName", layer_name);
        ctx.insert_opt("description", out.description.take());
        ctx.insert_opt("compatibleRuntimes", out.compatible_runtimes.take());
        ctx.insert_opt(
            "compatibleArchitectures",
            out.compatible_architectures.take(),
        );
        ctx.insert_opt("licenseInfo", out.license_info.take());
        recorded(ctx, READ, out)
    }
}
