//! Asynchronous invocation config operations

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters, Value, extract,
};

use super::{
    DESTINATIONS, deleted, destinations, not_prepared, remote_failure, returned_id, touched,
};
use crate::api::LambdaClient;
use crate::types::{Destinations, EventInvokeConfigOutput, EventInvokeConfigRequest};

const PUT: &str = "put function event invoke config";
const UPDATE: &str = "update function event invoke config";
const DELETE: &str = "delete function event invoke config";
const READ: &str = "get function event invoke config";

fn setters() -> Setters<EventInvokeConfigRequest> {
    Setters::<EventInvokeConfigRequest>::new()
        .int("$.maximumRetryAttempts", |r, v| {
            r.maximum_retry_attempts = Some(v)
        })
        .int("$.maximumEventAgeInSeconds", |r, v| {
            r.maximum_event_age_in_seconds = Some(v)
        })
        .with(DESTINATIONS, |node, r| {
            r.destination_config = Some(destinations(node))
        })
}

fn addressed(tree: &Value, operation: &'static str) -> ProviderResult<EventInvokeConfigRequest> {
    Ok(EventInvokeConfigRequest {
        function_name: extract::require_string(tree, "$.functionName", operation)?,
        qualifier: extract::optional_string(tree, "$.qualifier"),
        ..Default::default()
    })
}

fn recorded(ctx: SaveContext, operation: &'static str, out: EventInvokeConfigOutput) -> SaveResult {
    let (mut ctx, arn) =
        returned_id(ctx, operation, out.function_arn.as_deref(), "function ARN")?;
    ctx.insert("functionArn", arn.clone());
    ctx.insert_opt("lastModified", out.last_modified);
    ctx.set_upstream_id(arn);
    Ok(ctx)
}

#[derive(Default)]
pub struct PutEventInvokeConfig {
    request: Option<EventInvokeConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for PutEventInvokeConfig {
    fn name(&self) -> &'static str {
        PUT
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = addressed(tree, PUT)?;
        setters().try_apply(tree, &mut request, PUT)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, PUT);
        };
        match client.put_function_event_invoke_config(&request).await {
            Ok(out) => recorded(ctx, PUT, out),
            Err(err) => remote_failure(ctx, PUT, err),
        }
    }
}

#[derive(Default)]
pub struct UpdateEventInvokeConfig {
    request: Option<EventInvokeConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for UpdateEventInvokeConfig {
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

        // A dropped destination block is sent empty to clear it
        if touched(changes, DESTINATIONS) && request.destination_config.is_none() {
            request.destination_config = Some(Destinations::default());
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
        match client.update_function_event_invoke_config(&request).await {
            Ok(out) => recorded(ctx, UPDATE, out),
            Err(err) => remote_failure(ctx, UPDATE, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteEventInvokeConfig {
    request: Option<EventInvokeConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteEventInvokeConfig {
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
            .delete_function_event_invoke_config(
                &request.function_name,
                request.qualifier.as_deref(),
            )
            .await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadEventInvokeConfig {
    request: Option<EventInvokeConfigRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadEventInvokeConfig {
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
            .get_function_event_invoke_config(
                &request.function_name,
                request.qualifier.as_deref(),
            )
            .await
        {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        ctx.insert("functionName", request.function_name);
        ctx.insert_opt("qualifier", request.qualifier);
        ctx.insert_opt("maximumRetryAttempts", out.maximum_retry_attempts);
        ctx.insert_opt(
            "maximumEventAgeInSeconds",
            out.maximum_event_age_in_seconds,
        );
        let destinations = [
            ("onSuccess", out.on_success_destination.clone()),
            ("onFailure", out.on_failure_destination.clone()),
        ]
        .into_iter()
        .filter_map(|(key, destination)| {
            destination.map(|d| (key, Value::from_iter([("destination", Value::from(d))])))
        })
        .collect::<Vec<_>>();
        if !destinations.is_empty() {
            ctx.insert("destinationConfig", Value::from_iter(destinations));
        }
        recorded(ctx, READ, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubLambda;
    use carina_lambda_core::{ResourceAction, Sequence, diff};
    use serde_json::json;

    fn tree(doc: serde_json::Value) -> Value {
        Value::from_json(&doc).unwrap()
    }

    #[tokio::test]
    async fn put_records_function_arn() {
        let stub = StubLambda::new();
        let tree = tree(json!({
            "functionName": "f",
            "qualifier": "PROD",
            "maximumRetryAttempts": 0,
            "destinationConfig": {"onFailure": {"destination": "arn:aws:sqs:us-east-1:123456789012:dlq"}}
        }));

        let ctx = Sequence::<LambdaClient>::new(ResourceAction::Create)
            .then(PutEventInvokeConfig::default())
            .run(SaveContext::new(), &tree, &ChangeSet::new(), &stub)
            .await
            .unwrap();

        let arn = "arn:aws:lambda:us-east-1:123456789012:function:f:PROD";
        assert_eq!(ctx.upstream_id(), Some(arn));
        assert_eq!(ctx.get_str("functionArn"), Some(arn));
        let request = stub
            .last::<EventInvokeConfigRequest>("put_function_event_invoke_config")
            .unwrap();
        assert_eq!(request.maximum_retry_attempts, Some(0));
        assert_eq!(
            request.destination_config,
            Some(Destinations {
                on_success: None,
                on_failure: Some("arn:aws:sqs:us-east-1:123456789012:dlq".to_string()),
            })
        );
    }

    #[test]
    fn update_skipped_when_nothing_modifiable_changed() {
        let before = tree(json!({"functionName": "f", "maximumRetryAttempts": 1, "note": "a"}));
        let after = tree(json!({"functionName": "f", "maximumRetryAttempts": 1, "note": "b"}));

        let mut op = UpdateEventInvokeConfig::default();
        assert!(
            !op.prepare(&SaveContext::new(), &after, &diff(&before, &after, &[]))
                .unwrap()
        );
    }

    #[test]
    fn update_sends_changed_destination() {
        let before = tree(json!({"functionName": "f", "maximumRetryAttempts": 1}));
        let after = tree(json!({
            "functionName": "f",
            "maximumRetryAttempts": 1,
            "destinationConfig": {"onSuccess": {"destination": "arn:aws:sns:us-east-1:123456789012:done"}}
        }));

        let mut op = UpdateEventInvokeConfig::default();
        assert!(
            op.prepare(&SaveContext::new(), &after, &diff(&before, &after, &[]))
                .unwrap()
        );
        let request = op.request.unwrap();
        assert_eq!(request.maximum_retry_attempts, None);
        assert!(request.destination_config.unwrap().on_success.is_some());
    }

    #[test]
    fn update_sends_whole_destination_block() {
        let before = tree(json!({
            "functionName": "f",
            "destinationConfig": {
                "onSuccess": {"destination": "arn:aws:sns:us-east-1:123456789012:done"},
                "onFailure": {"destination": "arn:aws:sqs:us-east-1:123456789012:dlq"}
            }
        }));
        let after = tree(json!({
            "functionName": "f",
            "destinationConfig": {
                "onSuccess": {"destination": "arn:aws:sns:us-east-1:123456789012:done"},
                "onFailure": {"destination": "arn:aws:sqs:us-east-1:123456789012:dlq2"}
            }
        }));

        let mut op = UpdateEventInvokeConfig::default();
        assert!(
            op.prepare(&SaveContext::new(), &after, &diff(&before, &after, &[]))
                .unwrap()
        );
        assert_eq!(
            op.request.unwrap().destination_config,
            Some(Destinations {
                on_success: Some("arn:aws:sns:us-east-1:123456789012:done".to_string()),
                on_failure: Some("arn:aws:sqs:us-east-1:123456789012:dlq2".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn update_clears_removed_destination_block() {
        let stub = StubLambda::new();
        let before = tree(json!({
            "functionName": "f",
            "maximumRetryAttempts": 1,
            "destinationConfig": {"onFailure": {"destination": "arn:aws:sqs:us-east-1:123456789012:dlq"}}
        }));
        let after = tree(json!({"functionName": "f", "maximumRetryAttempts": 1}));

        Sequence::<LambdaClient>::new(ResourceAction::Update)
            .then(UpdateEventInvokeConfig::default())
            .run(SaveContext::new(), &after, &diff(&before, &after, &[]), &stub)
            .await
            .unwrap();

        assert_eq!(stub.calls(), vec!["update_function_event_invoke_config"]);
        let request = stub
            .last::<EventInvokeConfigRequest>("update_function_event_invoke_config")
            .unwrap();
        assert_eq!(request.destination_config, Some(Destinations::default()));
        assert_eq!(request.maximum_retry_attempts, None);
    }

    #[tokio::test]
    async fn read_writes_observed_settings() {
        let stub = StubLambda::new();
        let tree = tree(json!({"functionName": "f"}));

        let mut op = ReadEventInvokeConfig::default();
        op.prepare(&SaveContext::new(), &tree, &ChangeSet::new()).unwrap();
        let ctx = op.execute(SaveContext::new(), &stub).await.unwrap();

        assert_eq!(ctx.get("maximumRetryAttempts"), Some(&Value::from(1)));
        assert!(!ctx.contains("destinationConfig"));
        assert!(!ctx.contains("qualifier"));
        assert_eq!(
            ctx.upstream_id(),
            Some("arn:aws:lambda:us-east-1:123456789012:function:f:$LATEST")
        );
    }

    #[tokio::test]
    async fn delete_passes_qualifier() {
        let stub = StubLambda::new();
        let tree = tree(json!({"functionName": "f", "qualifier": "3"}));

        let mut op = DeleteEventInvokeConfig::default();
        op.prepare(&SaveContext::new(), &tree, &ChangeSet::new()).unwrap();
        op.execute(SaveContext::new(), &stub).await.unwrap();
        assert_eq!(
            stub.last::<(String, Option<String>)>("delete_function_event_invoke_config"),
            Some(("f".to_string(), Some("3".to_string())))
        );
    }
}
