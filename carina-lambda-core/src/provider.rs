//! Provider - Trait abstracting resource operations
//!
//! A Provider turns resource actions into sequences of save operations
//! against a specific cloud API and reports the resulting state.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::change::ChangeSet;
use crate::error::ProviderError;
use crate::operation::SaveFailure;
use crate::resource::{Resource, ResourceId, State};
use crate::value::Value;

/// Resource-level failure
///
/// Carries whatever the sequence established before failing, so a caller
/// whose create succeeded but whose tagging failed still learns the
/// identifier of the created resource.
#[derive(Debug)]
pub struct ApplyError {
    pub resource_id: ResourceId,
    pub error: ProviderError,
    /// Identifier established before the failure, if any
    pub identifier: Option<String>,
    /// Computed attributes established before the failure
    pub outputs: HashMap<String, Value>,
}

impl ApplyError {
    pub fn new(resource_id: ResourceId, error: ProviderError) -> Self {
        Self {
            resource_id,
            error,
            identifier: None,
            outputs: HashMap::new(),
        }
    }

    /// Build from a failed sequence, keeping the computed attributes in `keys`
    pub fn from_failure(resource_id: ResourceId, failure: SaveFailure, keys: &[&str]) -> Self {
        let outputs = failure.context.project(keys);
        let (identifier, _) = failure.context.into_parts();
        Self {
            resource_id,
            error: failure.error,
            identifier,
            outputs,
        }
    }

    /// Partial state the caller can record for the next reconciliation
    pub fn partial_state(&self) -> Option<State> {
        let identifier = self.identifier.as_ref()?;
        Some(
            State::existing(self.resource_id.clone(), Value::Map(self.outputs.clone()))
                .with_identifier(identifier.clone()),
        )
    }
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}.{}] {}",
            self.resource_id.resource_type, self.resource_id.name, self.error
        )
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type ApplyResult<T> = Result<T, ApplyError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "lambda.alias")
    fn name(&self) -> &'static str;

    /// Attributes produced by the remote API rather than declared by the caller
    fn computed_attributes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Fields whose change forces delete and recreate
    fn immutable_fields(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Main Provider trait
///
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "lambda")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of a resource
    ///
    /// `attributes` is the last known configuration tree (used to address
    /// the remote resource). Returns `State::not_found()` if it is gone.
    fn read(
        &self,
        id: &ResourceId,
        attributes: &Value,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ApplyResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the remote identifier
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ApplyResult<State>>;

    /// Update a resource in place
    fn update(
        &self,
        from: &State,
        to: &Resource,
        changes: &ChangeSet,
    ) -> BoxFuture<'_, ApplyResult<State>>;

    /// Delete a resource
    fn delete(&self, from: &State) -> BoxFuture<'_, ApplyResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        attributes: &Value,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ApplyResult<State>> {
        (**self).read(id, attributes, identifier)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ApplyResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        from: &State,
        to: &Resource,
        changes: &ChangeSet,
    ) -> BoxFuture<'_, ApplyResult<State>> {
        (**self).update(from, to, changes)
    }

    fn delete(&self, from: &State) -> BoxFuture<'_, ApplyResult<()>> {
        (**self).delete(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SaveContext;
    use crate::operation::{ResourceAction, SaveOperation, SaveResult, Sequence};
    use async_trait::async_trait;

    struct Stamp;

    #[async_trait]
    impl SaveOperation<()> for Stamp {
        fn name(&self) -> &'static str {
            "stamp"
        }

        fn prepare(
            &mut self,
            _ctx: &SaveContext,
            _tree: &Value,
            _changes: &ChangeSet,
        ) -> Result<bool, ProviderError> {
            Ok(true)
        }

        async fn execute(&mut self, mut ctx: SaveContext, _client: &()) -> SaveResult {
            ctx.insert("arn", "arn:stamped");
            ctx.set_upstream_id("arn:stamped");
            Ok(ctx)
        }
    }

    struct Refuse;

    #[async_trait]
    impl SaveOperation<()> for Refuse {
        fn name(&self) -> &'static str {
            "refuse"
        }

        fn prepare(
            &mut self,
            _ctx: &SaveContext,
            _tree: &Value,
            _changes: &ChangeSet,
        ) -> Result<bool, ProviderError> {
            Ok(true)
        }

        async fn execute(&mut self, ctx: SaveContext, _client: &()) -> SaveResult {
            Err(SaveFailure::new(
                ctx,
                ProviderError::invalid_value("refuse", "rejected"),
            ))
        }
    }

    /// Runs a stamp operation on create, optionally followed by one that fails
    struct SequenceProvider {
        fail_after_stamp: bool,
    }

    impl Provider for SequenceProvider {
        fn name(&self) -> &'static str {
            "sequence"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(
            &self,
            id: &ResourceId,
            _attributes: &Value,
            _identifier: Option<&str>,
        ) -> BoxFuture<'_, ApplyResult<State>> {
            let id = id.clone();
            Box::pin(async move { Ok(State::not_found(id)) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ApplyResult<State>> {
            let id = resource.id.clone();
            let spec = resource.spec.clone();
            let fail = self.fail_after_stamp;
            Box::pin(async move {
                let mut sequence = Sequence::<()>::new(ResourceAction::Create).then(Stamp);
                if fail {
                    sequence = sequence.then(Refuse);
                }
                let ctx = sequence
                    .run(SaveContext::new(), &spec, &ChangeSet::new(), &())
                    .await
                    .map_err(|failure| ApplyError::from_failure(id.clone(), failure, &["arn"]))?;
                let (identifier, data) = ctx.into_parts();
                let mut state = State::existing(id, Value::Map(data));
                state.identifier = identifier;
                Ok(state)
            })
        }

        fn update(
            &self,
            from: &State,
            _to: &Resource,
            _changes: &ChangeSet,
        ) -> BoxFuture<'_, ApplyResult<State>> {
            let state = from.clone();
            Box::pin(async move { Ok(state) })
        }

        fn delete(&self, _from: &State) -> BoxFuture<'_, ApplyResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn boxed_provider_reports_created_identifier() {
        let provider: Box<dyn Provider> = Box::new(SequenceProvider {
            fail_after_stamp: false,
        });
        let resource = Resource::new("test.stamped", "one");
        let state = provider.create(&resource).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("arn:stamped"));

        let gone = provider
            .read(&resource.id, &state.attributes, None)
            .await
            .unwrap();
        assert!(!gone.exists);
    }

    #[tokio::test]
    async fn failed_sequence_surfaces_partial_state() {
        let provider = SequenceProvider {
            fail_after_stamp: true,
        };
        let err = provider
            .create(&Resource::new("test.stamped", "one"))
            .await
            .unwrap_err();
        assert_eq!(err.error.operation(), Some("refuse"));
        let partial = err.partial_state().unwrap();
        assert_eq!(partial.identifier.as_deref(), Some("arn:stamped"));
        assert_eq!(partial.attributes.get("arn"), Some(&Value::from("arn:stamped")));
    }

    #[test]
    fn apply_error_keeps_partial_progress() {
        let mut ctx = SaveContext::new().with_upstream_id("arn:csc");
        ctx.insert("codeSigningConfigArn", "arn:csc");
        ctx.insert("scratch", 1i64);
        let failure = SaveFailure::new(
            ctx,
            ProviderError::missing_context("tag resource", "eventSourceMappingArn"),
        );

        let err = ApplyError::from_failure(
            ResourceId::new("lambda.code_signing_config", "signing"),
            failure,
            &["codeSigningConfigArn"],
        );

        assert_eq!(err.identifier.as_deref(), Some("arn:csc"));
        assert_eq!(err.outputs.len(), 1);
        assert_eq!(
            err.to_string(),
            "[lambda.code_signing_config.signing] tag resource: missing context value 'eventSourceMappingArn'"
        );
        let partial = err.partial_state().unwrap();
        assert_eq!(partial.identifier.as_deref(), Some("arn:csc"));
    }

    #[test]
    fn apply_error_without_identifier_has_no_partial_state() {
        let err = ApplyError::new(
            ResourceId::new("lambda.alias", "prod"),
            ProviderError::UnknownResourceType("lambda.alias".to_string()),
        );
        assert!(err.partial_state().is_none());
    }
}
