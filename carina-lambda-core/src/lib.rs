//! Carina Lambda Core
//!
//! Generic resource-operation engine: a path-addressed configuration tree,
//! declarative value setters that copy tree values into typed requests, and
//! a sequencer that runs save operations for one resource action.
//!
//! ## Module Structure
//!
//! - `value` - The configuration tree
//! - `path` - Path expressions and resolution
//! - `extract` - Typed leaf extractors
//! - `setter` - Value setters and setter batches
//! - `change` - Change sets between prior and desired state
//! - `context` - Save operation context
//! - `operation` - Save operation trait and sequencer
//! - `provider` - Provider trait and resource-level errors

pub mod change;
pub mod context;
pub mod error;
pub mod extract;
pub mod operation;
pub mod path;
pub mod provider;
pub mod resource;
pub mod setter;
pub mod value;

// Re-export main types
pub use change::{Change, ChangeSet, diff};
pub use context::SaveContext;
pub use error::{ProviderError, ProviderResult};
pub use operation::{ResourceAction, SaveFailure, SaveOperation, SaveResult, Sequence};
pub use path::{Path, PathError};
pub use provider::{ApplyError, ApplyResult, BoxFuture, Provider, ResourceType};
pub use resource::{Resource, ResourceId, State};
pub use setter::{Setters, ValueSetter};
pub use value::Value;
