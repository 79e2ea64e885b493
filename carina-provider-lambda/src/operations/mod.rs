//! Save operations for Lambda sub-resources
//!
//! Each operation wraps exactly one Lambda call. Operations are grouped by
//! resource kind; `tags` and the provisioned concurrency operations in
//! `alias` are shared between kinds.

pub mod alias;
pub mod code_signing_config;
pub mod event_invoke_config;
pub mod event_source_mapping;
pub mod function_url;
pub mod layer_permission;
pub mod layer_version;
pub mod tags;
pub mod version;

use carina_lambda_core::{
    ChangeSet, Path, ProviderError, ProviderResult, SaveContext, SaveFailure, SaveOperation,
    SaveResult, Value, extract,
};
use log::warn;

use crate::api::{ApiError, ApiResult, LambdaClient};
use crate::types::Destinations;

/// A save operation against the Lambda API
pub type LambdaOperation = Box<dyn SaveOperation<LambdaClient>>;

/// Where an operation finds a value it did not produce itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Path in the configuration tree
    Field(&'static str),
    /// Key written to the context by an earlier operation
    Context(&'static str),
    /// The context's upstream identifier
    Upstream,
}

impl Source {
    /// Resolve to a non-empty string, or fail on behalf of `operation`
    pub fn resolve(
        self,
        ctx: &SaveContext,
        tree: &Value,
        operation: &'static str,
    ) -> ProviderResult<String> {
        let value = match self {
            Source::Field(path) => {
                return extract::require_string(tree, path, operation);
            }
            Source::Context(key) => ctx.get_str(key),
            Source::Upstream => ctx.upstream_id(),
        };
        match value {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ProviderError::missing_context(operation, self.key())),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Source::Field(path) => path,
            Source::Context(key) => key,
            Source::Upstream => "upstreamId",
        }
    }
}

/// Destination block of mappings and invoke configs
pub(crate) const DESTINATIONS: &str = "$.destinationConfig";

/// The complete destination block at `node`; both sides travel together
pub(crate) fn destinations(node: &Value) -> Destinations {
    let destination = |side: &str| {
        node.get(side)
            .and_then(|d| d.get("destination"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Destinations {
        on_success: destination("onSuccess"),
        on_failure: destination("onFailure"),
    }
}

/// Whether `changes` touches the tree path `path`
pub(crate) fn touched(changes: &ChangeSet, path: &'static str) -> bool {
    changes.touches(&Path::literal(path))
}

pub(crate) fn not_prepared(ctx: SaveContext, operation: &'static str) -> SaveResult {
    Err(SaveFailure::new(ctx, ProviderError::NotPrepared(operation)))
}

pub(crate) fn remote_failure(ctx: SaveContext, operation: &'static str, err: ApiError) -> SaveResult {
    Err(SaveFailure::new(ctx, ProviderError::remote(operation, err)))
}

/// The identifier a call returned, or a failure if the response lacked it
pub(crate) fn returned_id(
    ctx: SaveContext,
    operation: &'static str,
    id: Option<&str>,
    field: &'static str,
) -> Result<(SaveContext, String), SaveFailure> {
    match id {
        Some(id) if !id.is_empty() => Ok((ctx, id.to_string())),
        _ => Err(SaveFailure::new(
            ctx,
            ProviderError::invalid_value(operation, format!("response has no {}", field)),
        )),
    }
}

/// Outcome of a delete call: a resource that is already gone counts as deleted
pub(crate) fn deleted(ctx: SaveContext, operation: &'static str, result: ApiResult<()>) -> SaveResult {
    match result {
        Ok(()) => Ok(ctx),
        Err(err) if err.is_not_found() => {
            warn!("{}: already gone ({})", operation, err);
            Ok(ctx)
        }
        Err(err) => remote_failure(ctx, operation, err),
    }
}

/// Whether a provider error wraps a not-found response from the API
pub fn is_not_found(err: &ProviderError) -> bool {
    match err {
        ProviderError::Remote { source, .. } => source
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_not_found),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_resolution() {
        let tree = Value::from_json(&json!({"functionName": "f"})).unwrap();
        let mut ctx = SaveContext::new().with_upstream_id("arn:csc");
        ctx.insert("version", "3");

        assert_eq!(
            Source::Field("$.functionName").resolve(&ctx, &tree, "op").unwrap(),
            "f"
        );
        assert_eq!(Source::Context("version").resolve(&ctx, &tree, "op").unwrap(), "3");
        assert_eq!(Source::Upstream.resolve(&ctx, &tree, "op").unwrap(), "arn:csc");

        let err = Source::Context("eventSourceMappingArn")
            .resolve(&ctx, &tree, "tag resource")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "tag resource: missing context value 'eventSourceMappingArn'"
        );
        assert!(matches!(
            Source::Field("$.qualifier").resolve(&ctx, &tree, "op"),
            Err(ProviderError::MissingField { .. })
        ));
    }

    #[test]
    fn test_deleted_tolerates_not_found() {
        let ctx = SaveContext::new().with_upstream_id("uuid-1");
        let ok = deleted(
            ctx.clone(),
            "delete event source mapping",
            Err(ApiError::NotFound("uuid-1".to_string())),
        )
        .unwrap();
        assert_eq!(ok, ctx);

        let failure = deleted(
            ctx.clone(),
            "delete event source mapping",
            Err(ApiError::Service("throttled".to_string())),
        )
        .unwrap_err();
        assert_eq!(failure.context, ctx);
        assert!(!is_not_found(&failure.error));
    }

    #[test]
    fn test_is_not_found_inspects_remote_source() {
        let err = ProviderError::remote("get alias", ApiError::NotFound("PROD".to_string()));
        assert!(is_not_found(&err));
        assert!(!is_not_found(&ProviderError::missing_field("get alias", "$.name")));
    }

    #[test]
    fn test_returned_id_requires_value() {
        let (_, id) = returned_id(SaveContext::new(), "create alias", Some("arn:a"), "alias ARN")
            .unwrap();
        assert_eq!(id, "arn:a");

        let failure = returned_id(SaveContext::new(), "create alias", None, "alias ARN").unwrap_err();
        assert_eq!(failure.error.to_string(), "create alias: response has no alias ARN");
    }
}
