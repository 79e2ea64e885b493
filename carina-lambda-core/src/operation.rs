//! Operation - Save operations and the sequencer that drives them
//!
//! A resource action (create, update, delete, read) is an ordered list of
//! save operations. Each operation is prepared (pure: builds its typed
//! request and decides whether it has work to do) and, if applicable,
//! executed (one remote call). The sequence stops at the first error and
//! does not roll back operations that already ran.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;

use crate::change::ChangeSet;
use crate::context::SaveContext;
use crate::error::ProviderError;
use crate::value::Value;

/// Failed operation: the error plus the context as it was before the failure
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SaveFailure {
    pub context: SaveContext,
    pub error: ProviderError,
}

impl SaveFailure {
    pub fn new(context: SaveContext, error: ProviderError) -> Self {
        Self { context, error }
    }

    pub fn into_error(self) -> ProviderError {
        self.error
    }
}

pub type SaveResult = Result<SaveContext, SaveFailure>;

/// Kind of resource action a sequence implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Update,
    Delete,
    Read,
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceAction::Create => "create",
            ResourceAction::Update => "update",
            ResourceAction::Delete => "delete",
            ResourceAction::Read => "read",
        };
        write!(f, "{}", s)
    }
}

/// One remote call within a resource action
///
/// `C` is the client capability the operation calls into.
#[async_trait]
pub trait SaveOperation<C: ?Sized + Sync>: Send {
    /// Human-readable name, used to prefix errors (e.g. "create alias")
    fn name(&self) -> &'static str;

    /// Build the request from `tree` and decide whether there is work to do.
    ///
    /// Must not perform I/O. Missing required fields are errors; nothing to
    /// do is `Ok(false)`.
    fn prepare(
        &mut self,
        ctx: &SaveContext,
        tree: &Value,
        changes: &ChangeSet,
    ) -> Result<bool, ProviderError>;

    /// Issue the remote call prepared earlier.
    ///
    /// On success returns `ctx` extended with the results. On failure hands
    /// `ctx` back unchanged inside the [`SaveFailure`].
    async fn execute(&mut self, ctx: SaveContext, client: &C) -> SaveResult;
}

/// An ordered list of save operations for one resource action
pub struct Sequence<C: ?Sized + Sync> {
    action: ResourceAction,
    operations: Vec<Box<dyn SaveOperation<C>>>,
}

impl<C: ?Sized + Sync> Sequence<C> {
    pub fn new(action: ResourceAction) -> Self {
        Self {
            action,
            operations: Vec::new(),
        }
    }

    pub fn then(mut self, operation: impl SaveOperation<C> + 'static) -> Self {
        self.operations.push(Box::new(operation));
        self
    }

    pub fn push(&mut self, operation: Box<dyn SaveOperation<C>>) {
        self.operations.push(operation);
    }

    pub fn action(&self) -> ResourceAction {
        self.action
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.operations.iter().map(|op| op.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run every operation in order, threading `ctx` through them.
    ///
    /// Stops at the first error and returns the last context produced by a
    /// successful operation alongside it.
    pub async fn run(
        mut self,
        ctx: SaveContext,
        tree: &Value,
        changes: &ChangeSet,
        client: &C,
    ) -> SaveResult {
        let action = self.action;
        let mut ctx = ctx;

        for op in self.operations.iter_mut() {
            let name = op.name();

            match op.prepare(&ctx, tree, changes) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{} {}: nothing to do, skipping", action, name);
                    continue;
                }
                Err(error) => {
                    warn!("{} {}: prepare failed: {}", action, name, error);
                    return Err(SaveFailure::new(ctx, error));
                }
            }

            ctx = match op.execute(ctx, client).await {
                Ok(next) => next,
                Err(failure) => {
                    warn!("{} {}: {}", action, name, failure.error);
                    return Err(failure);
                }
            };
            info!("{} {}: done", action, name);
        }

        Ok(ctx)
    }
}
