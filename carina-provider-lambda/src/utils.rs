//! Utility functions for value normalization and tag handling

use std::collections::HashMap;

use carina_lambda_core::Value;

/// Normalize region value (e.g., "aws.Region.ap_northeast_1" -> "ap-northeast-1")
pub fn normalize_region(s: &str) -> String {
    let region_part = if s.contains('.') {
        s.split('.').next_back().unwrap_or(s)
    } else {
        s
    };
    region_part.replace('_', "-")
}

/// Merge provider default tags under the resource's own `tags`
///
/// Resource tags win on key conflicts. Trees without default tags to add
/// are returned unchanged.
pub fn with_default_tags(spec: &Value, defaults: &HashMap<String, String>) -> Value {
    if defaults.is_empty() {
        return spec.clone();
    }
    let Value::Map(fields) = spec else {
        return spec.clone();
    };

    let mut tags: HashMap<String, Value> = defaults
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    if let Some(Value::Map(own)) = fields.get("tags") {
        tags.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    let mut fields = fields.clone();
    fields.insert("tags".to_string(), Value::Map(tags));
    Value::Map(fields)
}
