//! Event source mapping operations
//!
//! The mapping is addressed by the UUID Lambda assigns on create. Its ARN is
//! recorded in the context under `eventSourceMappingArn` for tagging.

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, ProviderResult, SaveContext, SaveOperation, SaveResult, Setters, Value, extract,
};

use super::{
    DESTINATIONS, Source, deleted, destinations, not_prepared, remote_failure, returned_id,
    touched,
};
use crate::api::LambdaClient;
use crate::types::{Destinations, EventSourceMappingOutput, EventSourceMappingRequest};

const CREATE: &str = "create event source mapping";
const UPDATE: &str = "update event source mapping";
const DELETE: &str = "delete event source mapping";
const READ: &str = "get event source mapping";

const FILTERS: &str = "$.filterCriteria.filters";

/// Patterns of `filterCriteria.filters[*].pattern`
fn filter_patterns(node: &Value) -> Vec<String> {
    node.as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(|filter| filter.get("pattern").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Fields that can change after creation
fn modifiable() -> Setters<EventSourceMappingRequest> {
    Setters::<EventSourceMappingRequest>::new()
        .string("$.functionName", |r, v| r.function_name = Some(v))
        .bool("$.enabled", |r, v| r.enabled = Some(v))
        .int("$.batchSize", |r, v| r.batch_size = Some(v))
        .int("$.maximumBatchingWindowInSeconds", |r, v| {
            r.maximum_batching_window_in_seconds = Some(v)
        })
        .int("$.parallelizationFactor", |r, v| {
            r.parallelization_factor = Some(v)
        })
        .int("$.maximumRecordAgeInSeconds", |r, v| {
            r.maximum_record_age_in_seconds = Some(v)
        })
        .bool("$.bisectBatchOnFunctionError", |r, v| {
            r.bisect_batch_on_function_error = Some(v)
        })
        .int("$.maximumRetryAttempts", |r, v| {
            r.maximum_retry_attempts = Some(v)
        })
        .int("$.tumblingWindowInSeconds", |r, v| {
            r.tumbling_window_in_seconds = Some(v)
        })
        .with(DESTINATIONS, |node, r| {
            r.destination_config = Some(destinations(node))
        })
        .strings("$.functionResponseTypes", |r, v| {
            r.function_response_types = Some(v)
        })
        .with(FILTERS, |node, r| r.filter_patterns = Some(filter_patterns(node)))
}

/// Fields fixed at creation
fn creation_only() -> Setters<EventSourceMappingRequest> {
    Setters::<EventSourceMappingRequest>::new()
        .string("$.eventSourceArn", |r, v| r.event_source_arn = Some(v))
        .string("$.startingPosition", |r, v| r.starting_position = Some(v))
        .strings("$.topics", |r, v| r.topics = Some(v))
        .strings("$.queues", |r, v| r.queues = Some(v))
}

/// `name` or `name:qualifier` part of a function ARN
fn function_reference(arn: &str) -> &str {
    arn.split_once(":function:").map_or(arn, |(_, rest)| rest)
}

/// Whether `name`, written as a name, `name:qualifier`, partial or full ARN,
/// designates the function at `arn`
fn designates(name: &str, arn: &str) -> bool {
    name == arn
        || name == function_reference(arn)
        || (name.contains(":function:") && arn.ends_with(&format!(":{}", name)))
}

fn record(ctx: &mut SaveContext, out: &EventSourceMappingOutput) {
    ctx.insert_opt("uuid", out.uuid.clone());
    ctx.insert_opt("eventSourceMappingArn", out.event_source_mapping_arn.clone());
    ctx.insert_opt("functionArn", out.function_arn.clone());
    ctx.insert_opt("state", out.state.clone());
    ctx.insert_opt("stateTransitionReason", out.state_transition_reason.clone());
    ctx.insert_opt("lastModified", out.last_modified.clone());
}

/// Record the mapping in `ctx`, keyed by its UUID
fn recorded(ctx: SaveContext, operation: &'static str, out: EventSourceMappingOutput) -> SaveResult {
    let (mut ctx, uuid) = returned_id(ctx, operation, out.uuid.as_deref(), "UUID")?;
    record(&mut ctx, &out);
    ctx.set_upstream_id(uuid);
    Ok(ctx)
}

#[derive(Default)]
pub struct CreateEventSourceMapping {
    request: Option<EventSourceMappingRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for CreateEventSourceMapping {
    fn name(&self) -> &'static str {
        CREATE
    }

    fn prepare(
        &mut self,
        _ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        extract::require_string(tree, "$.functionName", CREATE)?;

        let mut request = EventSourceMappingRequest::default();
        modifiable().try_apply(tree, &mut request, CREATE)?;
        creation_only().try_apply(tree, &mut request, CREATE)?;
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, CREATE);
        };
        match client.create_event_source_mapping(&request).await {
            Ok(out) => recorded(ctx, CREATE, out),
            Err(err) => remote_failure(ctx, CREATE, err),
        }
    }
}

#[derive(Default)]
pub struct UpdateEventSourceMapping {
    request: Option<EventSourceMappingRequest>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for UpdateEventSourceMapping {
    fn name(&self) -> &'static str {
        UPDATE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let mut request = EventSourceMappingRequest::default();
        let mut applicable = modifiable().try_apply_changed(tree, &mut request, changes, UPDATE)?;

        // Dropping every filter is sent as an empty list
        if touched(changes, FILTERS) && request.filter_patterns.is_none() {
            request.filter_patterns = Some(Vec::new());
            applicable = true;
        }
        if touched(changes, DESTINATIONS) && request.destination_config.is_none() {
            request.destination_config = Some(Destinations::default());
            applicable = true;
        }
        if !applicable {
            return Ok(false);
        }

        request.uuid = Some(Source::Upstream.resolve(ctx, tree, UPDATE)?);
        self.request = Some(request);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(request) = self.request.take() else {
            return not_prepared(ctx, UPDATE);
        };
        match client.update_event_source_mapping(&request).await {
            Ok(out) => recorded(ctx, UPDATE, out),
            Err(err) => remote_failure(ctx, UPDATE, err),
        }
    }
}

#[derive(Default)]
pub struct DeleteEventSourceMapping {
    uuid: Option<String>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for DeleteEventSourceMapping {
    fn name(&self) -> &'static str {
        DELETE
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.uuid = Some(Source::Upstream.resolve(ctx, tree, DELETE)?);
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(uuid) = self.uuid.take() else {
            return not_prepared(ctx, DELETE);
        };
        let result = client.delete_event_source_mapping(&uuid).await;
        deleted(ctx, DELETE, result)
    }
}

#[derive(Default)]
pub struct ReadEventSourceMapping {
    uuid: Option<String>,
    /// Function as the prior tree names it
    function_name: Option<String>,
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadEventSourceMapping {
    fn name(&self) -> &'static str {
        READ
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.uuid = Some(Source::Upstream.resolve(ctx, tree, READ)?);
        self.function_name = extract::optional_string(tree, "$.functionName");
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(uuid) = self.uuid.take() else {
            return not_prepared(ctx, READ);
        };
        let prior_name = self.function_name.take();
        let out = match client.get_event_source_mapping(&uuid).await {
            Ok(out) => out,
            Err(err) => return remote_failure(ctx, READ, err),
        };

        if let Some(arn) = &out.function_arn {
            let name = match prior_name {
                Some(name) if designates(&name, arn) => name,
                _ => function_reference(arn).to_string(),
            };
            ctx.insert("functionName", name);
        }
        ctx.insert_opt("eventSourceArn", out.event_source_arn.clone());
        ctx.insert_opt("batchSize", out.batch_size);
        ctx.insert_opt(
            "maximumBatchingWindowInSeconds",
            out.maximum_batching_window_in_seconds,
        );
        ctx.insert_opt("startingPosition", out.starting_position.clone());
        ctx.insert_opt("maximumRetryAttempts", out.maximum_retry_attempts);
        ctx.insert_opt("topics", out.topics.clone());
        ctx.insert_opt("queues", out.queues.clone());
        ctx.insert_opt("functionResponseTypes", out.function_response_types.clone());
        if let Some(destination) = out.on_failure_destination.clone() {
            ctx.insert(
                "destinationConfig",
                Value::from_iter([(
                    "onFailure",
                    Value::from_iter([("destination", Value::from(destination))]),
                )]),
            );
        }
        if let Some(patterns) = out.filter_patterns.clone() {
            let filters = patterns
                .into_iter()
                .map(|p| Value::from_iter([("pattern", Value::from(p))]))
                .collect::<Vec<_>>();
            ctx.insert(
                "filterCriteria",
                Value::from_iter([("filters", Value::from(filters))]),
            );
        }
        recorded(ctx, READ, out)
    }
}
