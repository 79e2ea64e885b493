//! Typed extractors for configuration tree leaves
//!
//! Callers check presence through a [`Path`] first. On a variant mismatch the
//! extractors fall back to the zero value of the primitive instead of failing.

use std::collections::HashMap;

use crate::error::{ProviderError, ProviderResult};
use crate::path::Path;
use crate::value::Value;

pub fn string(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

pub fn int(node: &Value) -> i64 {
    match node {
        Value::Int(i) => *i,
        _ => 0,
    }
}

/// Integer narrowed to `i32`; out-of-range values read as zero.
///
/// Setters reject out-of-range values through [`fits_i32`] before narrowing.
pub fn int32(node: &Value) -> i32 {
    i32::try_from(int(node)).unwrap_or_default()
}

/// Fails for an integer node outside the `i32` range
pub fn fits_i32(node: &Value) -> Result<(), String> {
    match node {
        Value::Int(i) if i32::try_from(*i).is_err() => {
            Err(format!("{} is outside the 32-bit integer range", i))
        }
        _ => Ok(()),
    }
}

/// Float value; integers widen, nothing narrows
pub fn float(node: &Value) -> f64 {
    match node {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        _ => 0.0,
    }
}

pub fn bool(node: &Value) -> bool {
    match node {
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// String elements of a list; non-string elements are skipped
pub fn string_list(node: &Value) -> Vec<String> {
    match node {
        Value::List(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// String entries of a map; non-string entries are skipped
pub fn string_map(node: &Value) -> HashMap<String, String> {
    match node {
        Value::Map(fields) => fields
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
        _ => HashMap::new(),
    }
}

/// Numeric entries of a map as floats
pub fn float_map(node: &Value) -> HashMap<String, f64> {
    match node {
        Value::Map(fields) => fields
            .iter()
            .filter(|(_, v)| matches!(v, Value::Float(_) | Value::Int(_)))
            .map(|(k, v)| (k.clone(), float(v)))
            .collect(),
        _ => HashMap::new(),
    }
}

// =============================================================================
// Required fields
// =============================================================================

/// Resolve a path that must be present for `operation` to proceed
pub fn require<'a>(
    tree: &'a Value,
    path: &'static str,
    operation: &'static str,
) -> ProviderResult<&'a Value> {
    Path::literal(path)
        .resolve(tree)
        .ok_or_else(|| ProviderError::missing_field(operation, path))
}

/// Required non-empty string
pub fn require_string(
    tree: &Value,
    path: &'static str,
    operation: &'static str,
) -> ProviderResult<String> {
    let value = string(require(tree, path, operation)?);
    if value.is_empty() {
        return Err(ProviderError::missing_field(operation, path));
    }
    Ok(value)
}

pub fn require_int(tree: &Value, path: &'static str, operation: &'static str) -> ProviderResult<i64> {
    match require(tree, path, operation)? {
        Value::Int(i) => Ok(*i),
        Value::String(s) => s.parse::<i64>().map_err(|_| {
            ProviderError::invalid_value(operation, format!("{} is not an integer: {}", path, s))
        }),
        other => Err(ProviderError::invalid_value(
            operation,
            format!("{} must be an integer, got {}", path, other.kind()),
        )),
    }
}

/// Optional string at `path`
pub fn optional_string(tree: &Value, path: &'static str) -> Option<String> {
    Path::literal(path).resolve(tree).map(string)
}
