//! Provider configuration

use std::collections::HashMap;

use carina_lambda_core::extract;
use carina_lambda_core::{ProviderError, ProviderResult, Value};

use crate::utils::normalize_region;

/// Configuration for the Lambda provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    /// AWS region in SDK form (e.g., "ap-northeast-1")
    pub region: String,
    /// Endpoint override, for local emulators
    pub endpoint_url: Option<String>,
    /// Tags applied to every taggable resource
    pub default_tags: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new(region: &str) -> Self {
        Self {
            region: normalize_region(region),
            ..Default::default()
        }
    }

    /// Build from the provider block's attributes
    pub fn from_value(attributes: &Value) -> ProviderResult<Self> {
        let config = AttributeReader(attributes);

        let region = config
            .get_string("region")
            .ok_or_else(|| ProviderError::configuration("Missing required attribute: region"))?;
        if region.is_empty() {
            return Err(ProviderError::configuration("region must not be empty"));
        }

        let default_tags = match attributes.get("default_tags") {
            None => HashMap::new(),
            Some(tags @ Value::Map(_)) => extract::string_map(tags),
            Some(other) => {
                return Err(ProviderError::configuration(format!(
                    "default_tags must be a map, got {}",
                    other.kind()
                )));
            }
        };

        Ok(Self {
            region: normalize_region(region),
            endpoint_url: config.get_string("endpoint_url").map(str::to_string),
            default_tags,
        })
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_default_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_tags.insert(key.into(), value.into());
        self
    }
}

struct AttributeReader<'a>(&'a Value);

impl AttributeReader<'_> {
    /// Get a string attribute value
    fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(doc: serde_json::Value) -> Value {
        Value::from_json(&doc).unwrap()
    }

    #[test]
    fn test_from_value_normalizes_region() {
        let config = ProviderConfig::from_value(&attributes(json!({
            "region": "aws.Region.ap_northeast_1",
            "default_tags": {"env": "prod"}
        })))
        .unwrap();

        assert_eq!(config.region, "ap-northeast-1");
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.default_tags["env"], "prod");
    }

    #[test]
    fn test_from_value_with_endpoint() {
        let config = ProviderConfig::from_value(&attributes(json!({
            "region": "us-east-1",
            "endpoint_url": "http://localhost:4566"
        })))
        .unwrap();
        assert_eq!(
            config,
            ProviderConfig::new("us-east-1").with_endpoint_url("http://localhost:4566")
        );
    }

    #[test]
    fn test_from_value_requires_region() {
        let err = ProviderConfig::from_value(&attributes(json!({}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required attribute: region"
        );
    }

    #[test]
    fn test_from_value_rejects_non_map_tags() {
        let err = ProviderConfig::from_value(&attributes(json!({
            "region": "us-east-1",
            "default_tags": ["env"]
        })))
        .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }
}
