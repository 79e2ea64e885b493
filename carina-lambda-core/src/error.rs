//! Error types for save operations

use thiserror::Error;

use crate::path::PathError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while preparing or executing a save operation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A required path does not resolve in the configuration tree
    #[error("{operation}: missing required field {path}")]
    MissingField {
        operation: &'static str,
        path: String,
    },

    /// A value an earlier operation should have produced is absent
    #[error("{operation}: missing context value '{key}'")]
    MissingContext {
        operation: &'static str,
        key: String,
    },

    /// A present value cannot be used
    #[error("{operation}: {message}")]
    InvalidValue {
        operation: &'static str,
        message: String,
    },

    /// The remote call failed
    #[error("{operation}: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// `execute` was called without a successful `prepare`
    #[error("{0}: executed before prepare")]
    NotPrepared(&'static str),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// The change set touches fields that cannot be updated in place
    #[error("{resource_type} cannot be updated in place ({}), delete and recreate", fields.join(", "))]
    ReplacementRequired {
        resource_type: String,
        fields: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl ProviderError {
    pub fn missing_field(operation: &'static str, path: impl Into<String>) -> Self {
        Self::MissingField {
            operation,
            path: path.into(),
        }
    }

    pub fn missing_context(operation: &'static str, key: impl Into<String>) -> Self {
        Self::MissingContext {
            operation,
            key: key.into(),
        }
    }

    pub fn invalid_value(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            operation,
            message: message.into(),
        }
    }

    /// Wrap a remote failure with the operation name
    pub fn remote(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Remote {
            operation,
            source: Box::new(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Name of the operation that failed, if the error came from one
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { operation, .. }
            | Self::MissingContext { operation, .. }
            | Self::InvalidValue { operation, .. }
            | Self::Remote { operation, .. } => Some(*operation),
            Self::NotPrepared(operation) => Some(*operation),
            _ => None,
        }
    }

    /// Whether retrying the same action could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("throttled")]
    struct Throttled;

    #[test]
    fn test_remote_error_carries_operation_name() {
        let err = ProviderError::remote("update event invoke config", Throttled);
        assert_eq!(err.to_string(), "update event invoke config: throttled");
        assert_eq!(err.operation(), Some("update event invoke config"));
        assert!(err.is_retryable());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_field_is_not_retryable() {
        let err = ProviderError::missing_field("create alias", "$.functionName");
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "create alias: missing required field $.functionName"
        );
    }

    #[test]
    fn test_replacement_required_display() {
        let err = ProviderError::ReplacementRequired {
            resource_type: "lambda.alias".to_string(),
            fields: vec!["$.name".to_string(), "$.functionName".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "lambda.alias cannot be updated in place ($.name, $.functionName), delete and recreate"
        );
    }

    #[test]
    fn test_path_error_is_transparent() {
        let err: ProviderError = PathError::Empty.into();
        assert_eq!(err.to_string(), "path is empty");
        assert_eq!(err.operation(), None);
    }
}
