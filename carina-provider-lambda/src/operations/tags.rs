//! Tagging operations shared by taggable resource kinds

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use carina_lambda_core::{
    ChangeSet, Path, ProviderResult, ResourceAction, SaveContext, SaveOperation, SaveResult, Value,
    extract,
};

use super::{Source, not_prepared, remote_failure, touched};
use crate::api::LambdaClient;

const TAG: &str = "tag resource";
const UNTAG: &str = "untag resource";
const LIST: &str = "list tags";

const TAGS: &str = "$.tags";

fn desired_tags(tree: &Value) -> HashMap<String, String> {
    Path::literal(TAGS)
        .resolve(tree)
        .map(extract::string_map)
        .unwrap_or_default()
}

/// Sets the desired tags on the resource named by `arn`
///
/// On create, applicable when the tree has tags. On update, when any tag
/// changed and tags remain.
pub struct TagResource {
    action: ResourceAction,
    arn: Source,
    request: Option<(String, HashMap<String, String>)>,
}

impl TagResource {
    pub fn new(action: ResourceAction, arn: Source) -> Self {
        Self {
            action,
            arn,
            request: None,
        }
    }
}

#[async_trait]
impl SaveOperation<LambdaClient> for TagResource {
    fn name(&self) -> &'static str {
        TAG
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        if self.action == ResourceAction::Update && !touched(changes, TAGS) {
            return Ok(false);
        }
        let tags = desired_tags(tree);
        if tags.is_empty() {
            return Ok(false);
        }
        self.request = Some((self.arn.resolve(ctx, tree, TAG)?, tags));
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((arn, tags)) = self.request.take() else {
            return not_prepared(ctx, TAG);
        };
        match client.tag_resource(&arn, &tags).await {
            Ok(()) => Ok(ctx),
            Err(err) => remote_failure(ctx, TAG, err),
        }
    }
}

/// Removes tag keys an update dropped
///
/// Keys still present in the desired tags, such as provider default tags the
/// change set was computed without, stay on the resource.
pub struct UntagResource {
    arn: Source,
    request: Option<(String, Vec<String>)>,
}

impl UntagResource {
    pub fn new(arn: Source) -> Self {
        Self { arn, request: None }
    }
}

/// Tag keys whose change leaves no value behind
fn removed_keys(changes: &ChangeSet) -> Vec<String> {
    let tags = Path::literal(TAGS);
    let mut keys = BTreeSet::new();
    for change in changes.under(&tags).filter(|c| c.is_removal()) {
        match change.path.segments() {
            // The whole map went away
            [_] => {
                if let Some(Value::Map(before)) = &change.before {
                    keys.extend(before.keys().cloned());
                }
            }
            [_, key] => {
                keys.insert(key.key());
            }
            _ => {}
        }
    }
    keys.into_iter().collect()
}

#[async_trait]
impl SaveOperation<LambdaClient> for UntagResource {
    fn name(&self) -> &'static str {
        UNTAG
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        let desired = desired_tags(tree);
        let keys: Vec<String> = removed_keys(changes)
            .into_iter()
            .filter(|key| !desired.contains_key(key))
            .collect();
        if keys.is_empty() {
            return Ok(false);
        }
        self.request = Some((self.arn.resolve(ctx, tree, UNTAG)?, keys));
        Ok(true)
    }

    async fn execute(&mut self, ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some((arn, keys)) = self.request.take() else {
            return not_prepared(ctx, UNTAG);
        };
        match client.untag_resource(&arn, &keys).await {
            Ok(()) => Ok(ctx),
            Err(err) => remote_failure(ctx, UNTAG, err),
        }
    }
}

/// Reads the tags of the resource named by `arn` into the context
pub struct ReadTags {
    arn: Source,
    request: Option<String>,
}

impl ReadTags {
    pub fn new(arn: Source) -> Self {
        Self { arn, request: None }
    }
}

#[async_trait]
impl SaveOperation<LambdaClient> for ReadTags {
    fn name(&self) -> &'static str {
        LIST
    }

    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        _changes: &ChangeSet,
    ) -> ProviderResult<bool> {
        self.request = Some(self.arn.resolve(ctx, tree, LIST)?);
        Ok(true)
    }

    async fn execute(&mut self, mut ctx: SaveContext, client: &LambdaClient) -> SaveResult {
        let Some(arn) = self.request.take() else {
            return not_prepared(ctx, LIST);
        };
        match client.list_tags(&arn).await {
            Ok(tags) => {
                if !tags.is_empty() {
                    ctx.insert("tags", tags);
                }
                Ok(ctx)
            }
            Err(err) => remote_failure(ctx, LIST, err),
        }
    }
}
