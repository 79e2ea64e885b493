//! Function URL operations

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters, Value, extract,
};

use super::{deleted, not_prepared, remote_failure, returned_id, touched};
use crate::api::LambdaClient;
use crate::types::{Cors, FunctionUrlOutput, FunctionUrlRequest};

const CREATE: &str = "create function url config";
const UPDATE: &str = "update function url config";
const DELETE: &str = "delete function url config";
const READ: &str = "get function url config";

const CORS: &str = "$.cors";

fn setters() -> Setters<FunctionUrlRequest> {
    Setters::<FunctionUrlRequest>::new()
        .string("$.authType", |r, v| r.auth_type = Some(v))
        .string("$.invokeMode", |r, v| r.invoke_mode = Some(v))
        .bool("$.cors.allowCredentials", |r, v| {
            r.cors_mut().allow_credentials = Some(v)
        })
        .strings("$.cors.allowHeaders", |r, v| {
            r.cors_mut().allow_headers = Some(v)
        })
        .strings("$.cors.allowMethods", |r, v| {
            r.cors_mut().allow_methods = Some(v)
        })
        .strings("$.cors.allowOrigins", |r, v| {
            r.cors_mut().allow_origins = Some(v)
        })
        .strings("$.cors.exposeHeaders", |r, v| {
            r.cors_mut().expose_headers = Some(v)
        })
        .int("$.cors.maxAge", |r, v| r.cors_mut().max_age = Some(v))
}

fn addressed(tree: &Value, operation: &'static str) -> ProviderResult<FunctionUrlRequest> {
    Ok(FunctionUrlRequest {
        function_name: extract::require_string(tree, "$.functionName", operation)?,
        qualifier: extract::optional_string(tree, "$.qualifier"),
        ..Default::default()
    })
}

fn cors_tree(cors: Cors) -> Value {
    let mut fields = Vec::new();
    if let Some(v) = cors.allow_credentials {
        fields.push(("allowCredentials", Value::from(v)));
    }
    let lists = [
        ("allowHeaders", cors.allow_headers),
        ("allowMethods", cors.allow_methods),
        ("allowOrigins", cors.allow_origins),
        ("exposeHeaders", cors.expose_headers),
    ];
    fields.extend(
        lists
            .into_iter()
            .filter_map(|(key, list)| list.map(|l| (key, Value::from(l)))),
    );
    if let Some(v) = cors.max_age {
        fields.push(("maxAge", Value::from(v)));
    }
    Value::from_iter(fields)
}

fn recorded(ctx: SaveContext, operation: &'static str, out: FunctionUrlOutput) -> SaveResult {
    let (mut ctx, url) = returned_id(ctx, operation, out.function_url.as_deref(), "function URL")?;
    ctx.insert("functionUrl", url.clone());
    ctx.insert_opt("functionArn", out.function_arn);
    ctx.insert_opt("creationTime", out.creation_time);
    ctx.insert_opt("lastModifiedTime", out.last_modified_time);
    ctx.set_upstream_id(url);
    Ok(ctx)
}

#[derive(Default)]
pub struct CreateFunctionUrl {
    request: Option<FunctionUrlRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for CreateFunctionUrl {
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
        extract::require_string(tree, "$.authType", CREATE)?;
        setters().try_apply(tree, &mut request, CREATE)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, CREATE);
        };
        match client.create_function_url_config(&request).await {
            Ok(out) => recorded(ctx, CREATE, out),
            Err(err) => remote_failure(ctx, CREATE, err),
        }
    }
}

#[derive(Default)]
pub struct UpdateFunctionUrl {
    request: Option<FunctionUrlRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for UpdateFunctionUrl {
    fn name(&self) -> &'static str {
        UPDATE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = addressed(tree, UPDATE)?;
        let mut applicable = setters().try_apply_changed(tree, &mut request, changes, UPDATE)?;

        // An empty CORS block removes the configuration
        if touched(changes, CORS) && request.cors.is_none() {
            request.cors = Some(Cors::default());
            applicable = true;
        }
        if !applicable {
            return Ok(false);
        }
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, UPDATE);
        };
        match client.update_function_url_config(&request).await {
            Ok(out) => recorded(ctx, UPDATE, out),
            Err(err) => remote_failure(ctx, UPDATE, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteFunctionUrl {
    request: Option<FunctionUrlRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteFunctionUrl {
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
            .delete_function_url_config(&request.function_name, request.qualifier.as_deref())
            .await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadFunctionUrl {
    request: Option<FunctionUrlRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadFunctionUrl {
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

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, READ);
        };
        let mut out = match client
            .get_function_url_config(&request.function_name, request.qualifier.as_deref())
            .await
        {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        ctx.insert("functionName", request.function_name);
        ctx.insert_opt("qualifier", request.qualifier);
        ctx.insert_opt("authType", out.auth_type.take());
        ctx.insert_opt("invokeMode", out.invoke_mode.take());
        if let Some(cors) = out.cors.take() {
            ctx.insert("cors", cors_tree(cors));
        }
        recorded(ctx, READ, out)
    }
}
