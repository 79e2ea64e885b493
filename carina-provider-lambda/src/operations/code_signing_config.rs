//! Code signing config operations

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters, Value, extract,
};

use super::{Source, deleted, not_prepared, remote_failure, returned_id};
use crate::api::LambdaClient;
use crate::types::{CodeSigningConfigOutput, CodeSigningConfigRequest};

const CREATE: &str = "create code signing config";
const UPDATE: &str = "update code signing config";
const DELETE: &str = "delete code signing config";
const READ: &str = "get code signing config";

const SIGNING_PROFILES: &str = "$.allowedPublishers.signingProfileVersionArns";

fn setters() -> Setters<CodeSigningConfigRequest> {
    Setters::<CodeSigningConfigRequest>::new()
        .string("$.description", |r, v| r.description = Some(v))
        .strings(SIGNING_PROFILES, |r, v| {
            r.signing_profile_version_arns = Some(v)
        })
        .string("$.codeSigningPolicies.untrustedArtifactOnDeployment", |r, v| {
            r.untrusted_artifact_on_deployment = Some(v)
        })
}

fn recorded(ctx: SaveContext, operation: &'static str, out: CodeSigningConfigOutput) -> SaveResult {
    let (mut ctx, arn) = returned_id(
        ctx,
        operation,
        out.code_signing_config_arn.as_deref(),
        "code signing config ARN",
    )?;
    ctx.insert("codeSigningConfigArn", arn.clone());
    ctx.insert_opt("codeSigningConfigId", out.code_signing_config_id);
    ctx.insert_opt("lastModified", out.last_modified);
    ctx.set_upstream_id(arn);
    Ok(ctx)
}

#[derive(Default)]
pub struct CreateCodeSigningConfig {
    request: Option<CodeSigningConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for CreateCodeSigningConfig {
    fn name(&self) -> &'static str {
        CREATE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        extract::require(tree, SIGNING_PROFILES, CREATE)?;

        let mut request = CodeSigningConfigRequest::default();
        setters().try_apply(tree, &mut request, CREATE)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, CREATE);
        };
        match client.create_code_signing_config(&request).await {
            Ok(out) => recorded(ctx, CREATE, out),
            Err(err) => remote_failure(ctx, CREATE, err),
        }
    }
}

#[derive(Default)]
pub struct UpdateCodeSigningConfig {
    request: Option<CodeSigningConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for UpdateCodeSigningConfig {
    fn name(&self) -> &'static str {
        UPDATE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = CodeSigningConfigRequest::default();
        if !setters().try_apply_changed(tree, &mut request, changes, UPDATE)? {
            return Ok(false);
        }
        request.code_signing_config_arn = Some(Source::Upstream.resolve(ctx, tree, UPDATE)?);
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, UPDATE);
        };
        match client.update_code_signing_config(&request).await {
            Ok(out) => recorded(ctx, UPDATE, out),
            Err(err) => remote_failure(ctx, UPDATE, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteCodeSigningConfig {
    arn: Option<String>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteCodeSigningConfig {
    fn name(&self) -> &'static str {
        DELETE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.arn = Some(Source::Upstream.resolve(ctx, tree, DELETE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(arn) = self.arn.take() else {
            return not_prepared(ctx, DELETE);
        };
        let result = client.delete_code_signing_config(&arn).await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadCodeSigningConfig {
    arn: Option<String>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadCodeSigningConfig {
    fn name(&self) -> &'static str {
        READ
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.arn = Some(Source::Upstream.resolve(ctx, tree, READ)?);
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(arn) = self.arn.take() else {
            return not_prepared(ctx, READ);
        };
        let mut out = match client.get_code_signing_config(&arn).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        ctx.insert_opt("description", out.description.take());
        if let Some(arns) = out.signing_profile_version_arns.take() {
            ctx.insert(
                "allowedPublishers",
                Value::from_iter([("signingProfileVersionArns", Value::from(arns))]),
            );
        }
        if let Some(policy) = out.untrusted_artifact_on_deployment.take() {
            ctx.insert(
                "codeSigningPolicies",
                Value::from_iter([("untrustedArtifactOnDeployment", Value::from(policy))]),
            );
        }
        recorded(ctx, READ, out)
    }
}
