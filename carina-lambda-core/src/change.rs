//! Change - Field paths that differ between prior and desired state
//!
//! Compares the desired configuration tree with the previously recorded
//! state and lists the paths whose values differ. Update operations consult
//! the resulting [`ChangeSet`] to decide whether their concern changed.

use std::collections::HashMap;

use crate::path::Path;
use crate::value::Value;

/// A single changed path
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Path,
    /// Value recorded in prior state, `None` if the field was absent
    pub before: Option<Value>,
    /// Desired value, `None` if the field was removed
    pub after: Option<Value>,
}

impl Change {
    pub fn is_removal(&self) -> bool {
        self.after.is_none()
    }
}

/// The set of changed paths for one update action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a change set from bare paths, without before/after values
    pub fn from_paths<'a, I>(paths: I) -> Result<Self, crate::path::PathError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let changes = paths
            .into_iter()
            .map(|p| {
                Ok(Change {
                    path: Path::parse(p)?,
                    before: None,
                    after: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { changes })
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn with(mut self, change: Change) -> Self {
        self.push(change);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Change recorded for exactly `path`
    pub fn get(&self, path: &Path) -> Option<&Change> {
        self.changes.iter().find(|c| &c.path == path)
    }

    /// Whether any change overlaps `path` (same path, ancestor or descendant)
    pub fn touches(&self, path: &Path) -> bool {
        self.changes.iter().any(|c| c.path.overlaps(path))
    }

    /// Changes at or below `prefix`
    pub fn under<'a>(&'a self, prefix: &'a Path) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| c.path.starts_with(prefix))
    }

    /// Changed paths that fall inside any of `fields`
    pub fn touched_among<'a>(&self, fields: &'a [Path]) -> Vec<&'a Path> {
        fields.iter().filter(|f| self.touches(f)).collect()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Compare the recorded state with the desired configuration.
///
/// Top-level keys in `ignored` (computed attributes) and keys starting with
/// `_` are skipped. Maps are compared in both directions, so a field present
/// in `current` but absent from `desired` is reported as a removal.
pub fn diff(current: &Value, desired: &Value, ignored: &[&str]) -> ChangeSet {
    let mut changes = ChangeSet::new();
    let empty = HashMap::new();
    let current_fields = current.as_map().unwrap_or(&empty);
    let desired_fields = desired.as_map().unwrap_or(&empty);

    let mut keys: Vec<&String> = desired_fields.keys().chain(current_fields.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        if key.starts_with('_') || ignored.contains(&key.as_str()) {
            continue;
        }
        let path = Path::root().child(key.as_str());
        diff_node(
            &path,
            current_fields.get(key),
            desired_fields.get(key),
            &mut changes,
        );
    }

    changes
}

fn diff_node(path: &Path, before: Option<&Value>, after: Option<&Value>, out: &mut ChangeSet) {
    match (before, after) {
        (Some(Value::Map(b)), Some(Value::Map(a))) => {
            let mut keys: Vec<&String> = b.keys().chain(a.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                diff_node(&path.child(key.as_str()), b.get(key), a.get(key), out);
            }
        }
        (b, a) if b == a => {}
        (b, a) => out.push(Change {
            path: path.clone(),
            before: b.cloned(),
            after: a.cloned(),
        }),
    }
}
