//! Setter - Declarative rules copying tree values into typed requests
//!
//! A [`ValueSetter`] pairs a path with a mutation closure. Applying it to a
//! `(tree, target)` pair runs the closure only if the path resolves, and
//! remembers whether it fired. [`Setters`] applies a batch in declaration
//! order; setters in one batch are expected to write disjoint fields.

use std::collections::HashMap;

use crate::change::ChangeSet;
use crate::error::{ProviderError, ProviderResult};
use crate::extract;
use crate::path::Path;
use crate::value::Value;

type ApplyFn<T> = Box<dyn Fn(&Value, &mut T) + Send + Sync>;
type CheckFn = fn(&Value) -> Result<(), String>;

/// A single path-to-field rule
pub struct ValueSetter<T> {
    path: Path,
    apply: ApplyFn<T>,
    check: Option<CheckFn>,
    fired: bool,
}

impl<T: 'static> ValueSetter<T> {
    pub fn new<F>(path: &'static str, apply: F) -> Self
    where
        F: Fn(&Value, &mut T) + Send + Sync + 'static,
    {
        Self {
            path: Path::literal(path),
            apply: Box::new(apply),
            check: None,
            fired: false,
        }
    }

    /// Reject values `check` refuses before they reach the target
    pub fn checked(mut self, check: CheckFn) -> Self {
        self.check = Some(check);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the check against the node at the path, if both exist
    pub fn validate(&self, tree: &Value) -> Result<(), String> {
        match (self.check, self.path.resolve(tree)) {
            (Some(check), Some(node)) => check(node).map_err(|m| format!("{}: {}", self.path, m)),
            _ => Ok(()),
        }
    }

    /// Apply to `target` if the path resolves in `tree`; returns whether it fired
    pub fn set(&mut self, tree: &Value, target: &mut T) -> bool {
        self.fired = match self.path.resolve(tree) {
            Some(node) => {
                (self.apply)(node, target);
                true
            }
            None => false,
        };
        self.fired
    }

    /// Whether the last `set` resolved its path
    pub fn fired(&self) -> bool {
        self.fired
    }

    fn skip(&mut self) {
        self.fired = false;
    }
}

impl<T> std::fmt::Debug for ValueSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSetter")
            .field("path", &self.path)
            .field("fired", &self.fired)
            .finish()
    }
}

/// An ordered batch of setters for one target type
#[derive(Debug)]
pub struct Setters<T> {
    setters: Vec<ValueSetter<T>>,
}

impl<T> Default for Setters<T> {
    fn default() -> Self {
        Self {
            setters: Vec::new(),
        }
    }
}

impl<T: 'static> Setters<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setter with a raw node closure
    pub fn with<F>(mut self, path: &'static str, apply: F) -> Self
    where
        F: Fn(&Value, &mut T) + Send + Sync + 'static,
    {
        self.setters.push(ValueSetter::new(path, apply));
        self
    }

    pub fn string(self, path: &'static str, apply: fn(&mut T, String)) -> Self {
        self.with(path, move |node, target| apply(target, extract::string(node)))
    }

    pub fn int(mut self, path: &'static str, apply: fn(&mut T, i32)) -> Self {
        let setter = ValueSetter::<T>::new(path, move |node, target| {
            apply(target, extract::int32(node))
        });
        self.setters.push(setter.checked(extract::fits_i32));
        self
    }

    pub fn long(self, path: &'static str, apply: fn(&mut T, i64)) -> Self {
        self.with(path, move |node, target| apply(target, extract::int(node)))
    }

    pub fn bool(self, path: &'static str, apply: fn(&mut T, bool)) -> Self {
        self.with(path, move |node, target| apply(target, extract::bool(node)))
    }

    pub fn strings(self, path: &'static str, apply: fn(&mut T, Vec<String>)) -> Self {
        self.with(path, move |node, target| {
            apply(target, extract::string_list(node))
        })
    }

    pub fn float_map(self, path: &'static str, apply: fn(&mut T, HashMap<String, f64>)) -> Self {
        self.with(path, move |node, target| apply(target, extract::float_map(node)))
    }

    /// Apply every setter in order; returns whether any fired
    pub fn apply(&mut self, tree: &Value, target: &mut T) -> bool {
        let mut any = false;
        for setter in &mut self.setters {
            any |= setter.set(tree, target);
        }
        any
    }

    /// Apply only the setters whose path is touched by `changes`
    pub fn apply_changed(&mut self, tree: &Value, target: &mut T, changes: &ChangeSet) -> bool {
        let mut any = false;
        for setter in &mut self.setters {
            if changes.touches(setter.path()) {
                any |= setter.set(tree, target);
            } else {
                setter.skip();
            }
        }
        any
    }

    /// Check every value the batch would copy, failing on behalf of `operation`
    pub fn validate(&self, tree: &Value, operation: &'static str) -> ProviderResult<()> {
        for setter in &self.setters {
            setter
                .validate(tree)
                .map_err(|message| ProviderError::invalid_value(operation, message))?;
        }
        Ok(())
    }

    /// [`Setters::apply`] after [`Setters::validate`]
    pub fn try_apply(
        &mut self,
        tree: &Value,
        target: &mut T,
        operation: &'static str,
    ) -> ProviderResult<bool> {
        self.validate(tree, operation)?;
        Ok(self.apply(tree, target))
    }

    /// [`Setters::apply_changed`] after [`Setters::validate`]
    pub fn try_apply_changed(
        &mut self,
        tree: &Value,
        target: &mut T,
        changes: &ChangeSet,
        operation: &'static str,
    ) -> ProviderResult<bool> {
        self.validate(tree, operation)?;
        Ok(self.apply_changed(tree, target, changes))
    }

    /// Whether any setter fired during the last application
    pub fn any_fired(&self) -> bool {
        self.setters.iter().any(ValueSetter::fired)
    }

    /// Paths of the setters that fired during the last application
    pub fn fired_paths(&self) -> Vec<&Path> {
        self.setters
            .iter()
            .filter(|s| s.fired())
            .map(ValueSetter::path)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }
}
