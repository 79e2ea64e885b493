//! Function version operations
//!
//! Publishing writes the new version number to the context under `version`;
//! provisioned concurrency, delete and read qualify the function with it.

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderError, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters,
    Value, extract,
};
use log::info;

use super::{Source, deleted, not_prepared, remote_failure, returned_id};
use crate::api::LambdaClient;
use crate::types::{PublishVersionRequest, VersionOutput};

const PUBLISH: &str = "publish version";
const DELETE: &str = "delete function version";
const READ: &str = "get function configuration";

/// Unpublished code; never a valid target for a version resource
const LATEST: &str = "$LATEST";

fn setters() -> Setters<PublishVersionRequest> {
    Setters::<PublishVersionRequest>::new()
        .string("$.codeSha256", |r, v| r.code_sha256 = Some(v))
        .string("$.description", |r, v| r.description = Some(v))
}

/// Function name and published version an operation is addressed to
fn qualified(
    ctx: &SaveContext,
    tree: &Value,
    operation: &'static str,
) -> ProviderResult<(String, String)> {
    let function_name = extract::require_string(tree, "$.functionName", operation)?;
    let version = Source::Context("version").resolve(ctx, tree, operation)?;
    if version == LATEST {
        return Err(ProviderError::invalid_value(
            operation,
            "version resource cannot address $LATEST",
        ));
    }
    Ok((function_name, version))
}

fn recorded(ctx: SaveContext, operation: &'static str, out: VersionOutput) -> SaveResult {
    let (mut ctx, arn) =
        returned_id(ctx, operation, out.function_arn.as_deref(), "function ARN")?;
    ctx.insert("functionArn", arn.clone());
    ctx.insert_opt("version", out.version);
    ctx.insert_opt("lastModified", out.last_modified);
    ctx.insert_opt("state", out.state);
    ctx.set_upstream_id(arn);
    Ok(ctx)
}

#[derive(Default)]
pub struct PublishVersion {
    request: Option<PublishVersionRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for PublishVersion {
    fn name(&self) -> &'static str {
        PUBLISH
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = PublishVersionRequest {
            function_name: extract::require_string(tree, "$.functionName", PUBLISH)?,
            ..Default::default()
        };
        setters().try_apply(tree, &mut request, PUBLISH)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, PUBLISH);
        };
        match client.publish_version(&request).await {
            Ok(out) => {
                info!(
                    "Published {} version {}",
                    request.function_name,
                    out.version.as_deref().unwrap_or("?")
                );
                recorded(ctx, PUBLISH, out)
            }
            Err(err) => remote_failure(ctx, PUBLISH, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteVersion {
    target: Option<(String, String)>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteVersion {
    fn name(&self) -> &'static str {
        DELETE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.target = Some(qualified(ctx, tree, DELETE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((function_name, version)) = self.target.take() else {
            return not_prepared(ctx, DELETE);
        };
        let result = client.delete_function(&function_name, Some(&version)).await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadVersion {
    target: Option<(String, String)>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadVersion {
    fn name(&self) -> &'static str {
        READ
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.target = Some(qualified(ctx, tree, READ)?);
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((function_name, version)) = self.target.take() else {
            return not_prepared(ctx, READ);
        };
        let mut out = match client
            .get_function_configuration(&function_name, Some(&version))
            .await
        {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        ctx.insert("functionName", function_name);
        ctx.insert_opt("codeSha256", out.code_sha256.take());
        ctx.insert_opt("description", out.description.take().filter(|d| !d.is_empty()));
        recorded(ctx, READ, out)
    }
}
