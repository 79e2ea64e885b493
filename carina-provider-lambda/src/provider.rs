//! Lambda Provider implementation
//!
//! This module contains the provider that turns resource actions into save
//! operation sequences and reports the resulting state.

use std::collections::HashMap;
use std::sync::Arc;

use carina_lambda_core::{
    ApplyError, ApplyResult, ChangeSet, Path, ProviderError, Resource, ResourceAction, ResourceId,
    SaveContext, State, Value,
};
use log::{debug, info};

use crate::api::LambdaClient;
use crate::client::AwsLambdaClient;
use crate::config::ProviderConfig;
use crate::operations::is_not_found;
use crate::resources::LambdaResource;
use crate::utils::with_default_tags;

/// AWS Lambda Provider
pub struct LambdaProvider {
    client: Arc<LambdaClient>,
    config: ProviderConfig,
}

impl LambdaProvider {
    /// Create a provider talking to Lambda in the configured region
    pub async fn new(config: ProviderConfig) -> Self {
        let client = AwsLambdaClient::from_config(&config).await;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a provider over any client, e.g. a stub in tests
    pub fn with_client(config: ProviderConfig, client: Arc<LambdaClient>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn kind(id: &ResourceId) -> ApplyResult<LambdaResource> {
        LambdaResource::from_type_name(&id.resource_type).ok_or_else(|| {
            ApplyError::new(
                id.clone(),
                ProviderError::UnknownResourceType(id.resource_type.clone()),
            )
        })
    }

    /// Desired tree with provider default tags merged in for taggable kinds
    fn desired_tree(&self, kind: LambdaResource, spec: &Value) -> Value {
        if kind.taggable() {
            with_default_tags(spec, &self.config.default_tags)
        } else {
            spec.clone()
        }
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Create a resource
    pub async fn create_resource(&self, resource: &Resource) -> ApplyResult<State> {
        let kind = Self::kind(&resource.id)?;
        let tree = self.desired_tree(kind, &resource.spec);
        info!("Creating {}", resource.id);
        debug!("{} desired: {}", resource.id, tree.to_json());

        let ctx = kind
            .sequence(ResourceAction::Create)
            .run(SaveContext::new(), &tree, &ChangeSet::new(), self.client.as_ref())
            .await
            .map_err(|failure| {
                ApplyError::from_failure(resource.id.clone(), failure, kind.computed_attributes())
            })?;

        Ok(saved_state(resource.id.clone(), kind, &tree, ctx))
    }

    /// Update a resource in place
    ///
    /// Fails before any remote call when `changes` touches an immutable field.
    pub async fn update_resource(
        &self,
        from: &State,
        to: &Resource,
        changes: &ChangeSet,
    ) -> ApplyResult<State> {
        let kind = Self::kind(&to.id)?;

        let immutable: Vec<Path> = kind
            .immutable_fields()
            .iter()
            .map(|field| Path::from_fields([*field]))
            .collect();
        let blocked = changes.touched_among(&immutable);
        if !blocked.is_empty() {
            return Err(ApplyError::new(
                to.id.clone(),
                ProviderError::ReplacementRequired {
                    resource_type: to.id.resource_type.clone(),
                    fields: blocked.iter().map(|p| p.to_string()).collect(),
                },
            ));
        }

        let tree = self.desired_tree(kind, &to.spec);
        info!("Updating {}", to.id);
        debug!(
            "{}: {} changed path(s), desired: {}",
            to.id,
            changes.len(),
            tree.to_json()
        );

        let ctx = resumed(from.identifier.clone(), &from.attributes, kind);
        let ctx = kind
            .sequence(ResourceAction::Update)
            .run(ctx, &tree, changes, self.client.as_ref())
            .await
            .map_err(|failure| {
                ApplyError::from_failure(to.id.clone(), failure, kind.computed_attributes())
            })?;

        Ok(saved_state(to.id.clone(), kind, &tree, ctx))
    }

    /// Delete a resource
    pub async fn delete_resource(&self, from: &State) -> ApplyResult<()> {
        let kind = Self::kind(&from.id)?;
        info!("Deleting {}", from.id);

        let ctx = resumed(from.identifier.clone(), &from.attributes, kind);
        kind.sequence(ResourceAction::Delete)
            .run(ctx, &from.attributes, &ChangeSet::new(), self.client.as_ref())
            .await
            .map_err(|failure| {
                ApplyError::from_failure(from.id.clone(), failure, kind.computed_attributes())
            })?;
        Ok(())
    }

    /// Read a resource's current state
    ///
    /// `attributes` is the last known tree; it addresses the resource and
    /// supplies the fields the API does not report back.
    pub async fn read_resource(
        &self,
        id: &ResourceId,
        attributes: &Value,
        identifier: Option<&str>,
    ) -> ApplyResult<State> {
        let kind = Self::kind(id)?;
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };

        let ctx = resumed(Some(identifier.to_string()), attributes, kind);
        let ctx = match kind
            .sequence(ResourceAction::Read)
            .run(ctx, attributes, &ChangeSet::new(), self.client.as_ref())
            .await
        {
            Ok(ctx) => ctx,
            Err(failure) if is_not_found(&failure.error) => {
                debug!("{} no longer exists: {}", id, failure.error);
                return Ok(State::not_found(id.clone()));
            }
            Err(failure) => {
                return Err(ApplyError::from_failure(
                    id.clone(),
                    failure,
                    kind.computed_attributes(),
                ));
            }
        };

        // Tags come back from the API in full; stale ones must not survive
        let mut base = attributes.clone();
        if kind.taggable()
            && let Value::Map(fields) = &mut base
        {
            fields.remove("tags");
        }

        let (upstream_id, observed) = ctx.into_parts();
        let state = State::existing(id.clone(), base.merged(&observed));
        Ok(state.with_identifier(upstream_id.unwrap_or_else(|| identifier.to_string())))
    }
}

/// Context for acting on an existing resource: its identifier plus the
/// computed attributes recorded when it was last saved
fn resumed(identifier: Option<String>, attributes: &Value, kind: LambdaResource) -> SaveContext {
    let computed: HashMap<String, Value> = kind
        .computed_attributes()
        .iter()
        .filter_map(|key| attributes.get(key).map(|v| (key.to_string(), v.clone())))
        .collect();
    SaveContext::resume(identifier, computed)
}

/// State after a successful create or update
fn saved_state(id: ResourceId, kind: LambdaResource, tree: &Value, ctx: SaveContext) -> State {
    let outputs = ctx.project(kind.computed_attributes());
    let (identifier, _) = ctx.into_parts();
    let state = State::existing(id, tree.merged(&outputs));
    match identifier {
        Some(identifier) => state.with_identifier(identifier),
        None => state,
    }
}
