//! Resource - Representing resources and their state

use std::collections::HashMap;

use crate::value::Value;

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "lambda.alias")
    pub resource_type: String,
    /// Resource name (identifier specified by the caller)
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Desired state: the configuration tree for one resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub spec: Value,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            spec: Value::empty_map(),
        }
    }

    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Map(fields) = &mut self.spec {
            fields.insert(key.into(), value.into());
        }
        self
    }
}

/// Current state recorded after an action or fetched from the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: ResourceId,
    /// Remote identifier (alias ARN, mapping UUID, function URL, ...)
    pub identifier: Option<String>,
    /// Configuration tree including computed attributes
    pub attributes: Value,
    /// Whether this state exists
    pub exists: bool,
}

impl State {
    pub fn not_found(id: ResourceId) -> Self {
        Self {
            id,
            identifier: None,
            attributes: Value::empty_map(),
            exists: false,
        }
    }

    pub fn existing(id: ResourceId, attributes: Value) -> Self {
        Self {
            id,
            identifier: None,
            attributes,
            exists: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Attributes listed in `keys`, typically the computed ones
    pub fn select(&self, keys: &[&str]) -> HashMap<String, Value> {
        keys.iter()
            .filter_map(|k| self.attributes.get(k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_with_attribute() {
        let resource = Resource::new("lambda.alias", "prod")
            .with_attribute("functionName", "f")
            .with_attribute("functionVersion", "1");
        assert_eq!(resource.spec.get("functionName"), Some(&Value::from("f")));
        assert_eq!(resource.id.to_string(), "lambda.alias.prod");
    }

    #[test]
    fn test_state_select() {
        let attributes: Value = [
            ("name", Value::from("PROD")),
            ("aliasArn", Value::from("arn:a")),
        ]
        .into_iter()
        .collect();
        let state = State::existing(ResourceId::new("lambda.alias", "prod"), attributes)
            .with_identifier("arn:a");

        let selected = state.select(&["aliasArn", "revisionId"]);
        assert_eq!(selected.len(), 1);
        assert_eq!(state.identifier.as_deref(), Some("arn:a"));
        assert!(State::not_found(state.id.clone()).attributes.as_map().unwrap().is_empty());
    }
}
