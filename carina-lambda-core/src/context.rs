//! Save operation context
//!
//! The context is owned by exactly one operation at a time. `execute` takes
//! it by value and returns it extended with whatever the remote call
//! produced, so writes compound across a sequence without shared aliasing.

use std::collections::HashMap;

use crate::value::Value;

/// Intermediate results threaded through a sequence of save operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveContext {
    data: HashMap<String, Value>,
    upstream_id: Option<String>,
}

impl SaveContext {
    /// Empty context for a fresh create action
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for an action on an existing resource, seeded with its
    /// identifier and previously computed values
    pub fn resume(upstream_id: Option<String>, data: HashMap<String, Value>) -> Self {
        Self { data, upstream_id }
    }

    pub fn upstream_id(&self) -> Option<&str> {
        self.upstream_id.as_deref()
    }

    pub fn set_upstream_id(&mut self, id: impl Into<String>) {
        self.upstream_id = Some(id.into());
    }

    pub fn with_upstream_id(mut self, id: impl Into<String>) -> Self {
        self.set_upstream_id(id);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value stored under `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Insert only when a value is present; absent values leave earlier data intact
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.upstream_id.is_none()
    }

    /// Values stored under `keys`, for surfacing as computed attributes
    pub fn project(&self, keys: &[&str]) -> HashMap<String, Value> {
        keys.iter()
            .filter_map(|k| self.data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }

    pub fn into_parts(self) -> (Option<String>, HashMap<String, Value>) {
        (self.upstream_id, self.data)
    }
}
