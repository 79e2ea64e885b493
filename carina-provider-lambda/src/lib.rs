//! Carina Lambda Provider
//!
//! Manages AWS Lambda sub-resources (aliases, versions, event source
//! mappings, function URLs, layers, code signing configs) by running save
//! operation sequences against the Lambda API.
//!
//! ## Module Structure
//!
//! - `api` - The Lambda calls save operations depend on
//! - `client` - `LambdaApi` over the AWS SDK
//! - `config` - Provider configuration
//! - `operations` - Save operations, one remote call each
//! - `resources` - Resource kinds and their operation sequences
//! - `provider` - LambdaProvider implementation
//! - `types` - Request and response shapes
//! - `utils` - Helper functions for value normalization

pub mod api;
pub mod client;
pub mod config;
pub mod operations;
pub mod provider;
pub mod resources;
pub mod types;
pub mod utils;

#[cfg(test)]
mod stub;

// Re-export main types
pub use api::{ApiError, ApiResult, LambdaApi, LambdaClient};
pub use client::AwsLambdaClient;
pub use config::ProviderConfig;
pub use provider::LambdaProvider;
pub use resources::LambdaResource;
pub use utils::{normalize_region, with_default_tags};

use carina_lambda_core::{
    ApplyResult, BoxFuture, ChangeSet, Provider, Resource, ResourceId, ResourceType, State, Value,
};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for LambdaProvider {
    fn name(&self) -> &'static str {
        "lambda"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        attributes: &Value,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ApplyResult<State>> {
        let id = id.clone();
        let attributes = attributes.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move {
            self.read_resource(&id, &attributes, identifier.as_deref())
                .await
        })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ApplyResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        from: &State,
        to: &Resource,
        changes: &ChangeSet,
    ) -> BoxFuture<'_, ApplyResult<State>> {
        let from = from.clone();
        let to = to.clone();
        let changes = changes.clone();
        Box::pin(async move { self.update_resource(&from, &to, &changes).await })
    }

    fn delete(&self, from: &State) -> BoxFuture<'_, ApplyResult<()>> {
        let from = from.clone();
        Box::pin(async move { self.delete_resource(&from).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubLambda;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_provider_trait_round_trip() {
        let stub = Arc::new(StubLambda::new());
        let provider: Box<dyn Provider> = Box::new(LambdaProvider::with_client(
            ProviderConfig::new("aws.Region.us_east_1"),
            stub.clone(),
        ));
        assert_eq!(provider.name(), "lambda");
        assert_eq!(provider.resource_types().len(), LambdaResource::ALL.len());

        let resource = Resource::new("lambda.function_url", "public").with_spec(
            Value::from_json(&json!({"functionName": "f", "authType": "NONE"})).unwrap(),
        );
        let state = provider.create(&resource).await.unwrap();
        let url = state.identifier.clone().unwrap();
        assert_eq!(url, "https://f.lambda-url.us-east-1.on.aws/");

        let read = provider
            .read(&resource.id, &state.attributes, Some(&url))
            .await
            .unwrap();
        assert!(read.exists);
        assert_eq!(read.attributes.get("authType"), Some(&Value::from("NONE")));

        provider.delete(&read).await.unwrap();
        assert_eq!(
            stub.calls(),
            vec![
                "create_function_url_config",
                "get_function_url_config",
                "delete_function_url_config"
            ]
        );
    }
}
