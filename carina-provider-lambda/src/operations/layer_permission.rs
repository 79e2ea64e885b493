//! Layer version permission operations
//!
//! A permission is one statement of the layer version's resource policy,
//! addressed by the layer version ARN and its statement id.

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderError, ProviderResult, SaveContext, SaveFailure, SaveOperation, SaveResult,
    Value, extract,
};

use super::{deleted, not_prepared, remote_failure};
use crate::api::{ApiError, LambdaClient};
use crate::types::LayerPermissionRequest;

const ADD: &str = "add layer version permission";
const REMOVE: &str = "remove layer version permission";
const READ: &str = "get layer version policy";

/// Split `arn:...:layer:<name>:<version>` into the layer ARN and version number
pub(crate) fn split_layer_version_arn(
    arn: &str,
    operation: &'static str,
) -> ProviderResult<(String, i64)> {
    let invalid = || {
        ProviderError::invalid_value(operation, format!("not a layer version ARN: {}", arn))
    };
    let (layer, version) = arn.rsplit_once(':').ok_or_else(invalid)?;
    if !layer.contains(":layer:") {
        return Err(invalid());
    }
    let version = version.parse::<i64>().map_err(|_| invalid())?;
    Ok((layer.to_string(), version))
}

fn addressed(tree: &Value, operation: &'static str) -> ProviderResult<LayerPermissionRequest> {
    let arn = extract::require_string(tree, "$.layerVersionArn", operation)?;
    let (layer_name, version_number) = split_layer_version_arn(&arn, operation)?;
    Ok(LayerPermissionRequest {
        layer_name,
        version_number,
        statement_id: extract::require_string(tree, "$.statementId", operation)?,
        ..Default::default()
    })
}

/// Principal as the caller wrote it: `*`, or the account id of an IAM root ARN
fn principal_of(statement: &serde_json::Value) -> Option<String> {
    match statement.get("Principal")? {
        serde_json::Value::String(p) => Some(p.clone()),
        serde_json::Value::Object(map) => {
            let arn = map.get("AWS")?.as_str()?;
            let account = arn
                .strip_prefix("arn:aws:iam::")
                .and_then(|rest| rest.strip_suffix(":root"))
                .unwrap_or(arn);
            Some(account.to_string())
        }
        _ => None,
    }
}

fn organization_of(statement: &serde_json::Value) -> Option<String> {
    statement
        .pointer("/Condition/StringEquals/aws:PrincipalOrgID")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[derive(Default)]
pub struct AddLayerPermission {
    request: Option<LayerPermissionRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for AddLayerPermission {
    fn name(&self) -> &'static str {
        ADD
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = addressed(tree, ADD)?;
        request.action = extract::require_string(tree, "$.action", ADD)?;
        request.principal = extract::require_string(tree, "$.principal", ADD)?;
        request.organization_id = extract::optional_string(tree, "$.organizationId");
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, ADD);
        };
        match client.add_layer_version_permission(&request).await {
            Ok(out) => {
                ctx.insert_opt("statement", out.statement);
                ctx.insert_opt("revisionId", out.revision_id);
                ctx.set_upstream_id(request.statement_id);
                Ok(ctx)
            }
            Err(err) => remote_failure(ctx, ADD, err),
        }
    }
}

#[derive(Default)]
pub struct RemoveLayerPermission {
    request: Option<LayerPermissionRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for RemoveLayerPermission {
    fn name(&self) -> &'static str {
        REMOVE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.request = Some(addressed(tree, REMOVE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, REMOVE);
        };
        let result = client
            .remove_layer_version_permission(
                &request.layer_name,
                request.version_number,
                &request.statement_id,
            )
            .await;
        deleted(ctx, REMOVE, result)
    }
}

#[derive(Default)]
pub struct ReadLayerPermission {
    request: Option<LayerPermissionRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadLayerPermission {
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
        let out = match client
            .get_layer_version_policy(&request.layer_name, request.version_number)
            .await
        {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        let parsed = out
            .policy
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>);
        let policy = match parsed {
            Some(Ok(policy)) => policy,
            Some(Err(e)) => {
                return Err(SaveFailure::new(
                    ctx,
                    ProviderError::invalid_value(READ, format!("unreadable policy: {}", e)),
                ));
            }
            None => serde_json::Value::Null,
        };
        let sid = request.statement_id.as_str();
        let statement = policy
            .get("Statement")
            .and_then(serde_json::Value::as_array)
            .and_then(|statements| {
                statements
                    .iter()
                    .find(|s| s.get("Sid").and_then(serde_json::Value::as_str) == Some(sid))
            });
        let Some(statement) = statement else {
            return remote_failure(
                ctx,
                READ,
                ApiError::NotFound(format!("statement {}", request.statement_id)),
            );
        };

        ctx.insert(
            "layerVersionArn",
            format!("{}:{}", request.layer_name, request.version_number),
        );
        ctx.insert("statementId", request.statement_id.clone());
        ctx.insert_opt(
            "action",
            statement
                .get("Action")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        );
        ctx.insert_opt("principal", principal_of(statement));
        ctx.insert_opt("organizationId", organization_of(statement));
        ctx.insert("statement", statement.to_string());
        ctx.insert_opt("revisionId", out.revision_id);
        ctx.set_upstream_id(request.statement_id);
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::is_not_found;
    use crate::stub::StubLambda;
    use serde_json::json;

    const ARN: &str = "arn:aws:lambda:us-east-1:123456789012:layer:deps:1";

    fn tree(doc: serde_json::Value) -> Value {
        Value::from_json(&doc).unwrap()
    }

    #[test]
    fn test_split_layer_version_arn() {
        assert_eq!(
            split_layer_version_arn(ARN, ADD).unwrap(),
            ("arn:aws:lambda:us-east-1:123456789012:layer:deps".to_string(), 1)
        );
        assert!(split_layer_version_arn("arn:aws:lambda:us-east-1:1:function:f:1", ADD).is_err());
        assert!(split_layer_version_arn("arn:aws:lambda:us-east-1:1:layer:deps:x", ADD).is_err());
        assert!(split_layer_version_arn("deps", ADD).is_err());
    }

    #[tokio::test]
    async fn add_uses_statement_id_as_upstream_id() {
        let stub = StubLambda::new();
        let tree = tree(json!({
            "layerVersionArn": ARN,
            "statementId": "share",
            "action": "lambda:GetLayerVersion",
            "principal": "*",
            "organizationId": "o-abc"
        }));

        let mut op = AddLayerPermission::default();
        op.prepare(&SaveContext::new(), &tree, &ChangeSet::new()).unwrap();
        let ctx = op.execute(SaveContext::new(), &stub).await.unwrap();

        assert_eq!(ctx.upstream_id(), Some("share"));
        assert_eq!(ctx.get_str("revisionId"), Some("rev-1"));
        let request = stub
            .last::<LayerPermissionRequest>("add_layer_version_permission")
            .unwrap();
        assert_eq!(request.version_number, 1);
        assert_eq!(request.organization_id.as_deref(), Some("o-abc"));
    }

    #[test]
    fn add_requires_principal() {
        let tree = tree(json!({
            "layerVersionArn": ARN,
            "statementId": "share",
            "action": "lambda:GetLayerVersion"
        }));
        let err = AddLayerPermission::default()
            .prepare(&SaveContext::new(), &tree, &ChangeSet::new())
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingField { .. }));
    }

    #[tokio::test]
    async fn read_finds_statement_in_policy() {
        let stub = StubLambda::new();
        let tree = tree(json!({"layerVersionArn": ARN, "statementId": "share"}));

        let mut op = ReadLayerPermission::default();
        op.prepare(&SaveContext::new(), &tree, &ChangeSet::new()).unwrap();
        let ctx = op.execute(SaveContext::new(), &stub).await.unwrap();

        assert_eq!(ctx.get_str("principal"), Some("*"));
        assert_eq!(ctx.get_str("action"), Some("lambda:GetLayerVersion"));
        assert_eq!(ctx.get_str("layerVersionArn"), Some(ARN));
        assert!(!ctx.contains("organizationId"));
    }

    #[tokio::test]
    async fn read_missing_statement_is_not_found() {
        let stub = StubLambda::new();
        let tree = tree(json!({"layerVersionArn": ARN, "statementId": "other"}));

        let mut op = ReadLayerPermission::default();
        op.prepare(&SaveContext::new(), &tree, &ChangeSet::new()).unwrap();
        let failure = op.execute(SaveContext::new(), &stub).await.unwrap_err();
        assert!(is_not_found(&failure.error));
    }

    #[test]
    fn principal_forms() {
        let account = json!({"Principal": {"AWS": "arn:aws:iam::210987654321:root"}});
        assert_eq!(principal_of(&account).as_deref(), Some("210987654321"));
        let org = json!({"Condition": {"StringEquals": {"aws:PrincipalOrgID": "o-abc"}}});
        assert_eq!(organization_of(&org).as_deref(), Some("o-abc"));
    }
}
