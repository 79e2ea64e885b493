//! Resource kinds of the Lambda provider
//!
//! This module defines:
//! - Resource type definitions (implementing ResourceType trait)
//! - The save operation sequence each kind runs for each resource action

use carina_lambda_core::{ResourceAction, ResourceType, Sequence};

use crate::api::LambdaClient;
use crate::operations::Source;
use crate::operations::alias::{
    CreateAlias, DeleteAlias, DeleteProvisionedConcurrency, PutProvisionedConcurrency, ReadAlias,
    UpdateAlias,
};
use crate::operations::code_signing_config::{
    CreateCodeSigningConfig, DeleteCodeSigningConfig, ReadCodeSigningConfig,
    UpdateCodeSigningConfig,
};
use crate::operations::event_invoke_config::{
    DeleteEventInvokeConfig, PutEventInvokeConfig, ReadEventInvokeConfig, UpdateEventInvokeConfig,
};
use crate::operations::event_source_mapping::{
    CreateEventSourceMapping, DeleteEventSourceMapping, ReadEventSourceMapping,
    UpdateEventSourceMapping,
};
use crate::operations::function_url::{
    CreateFunctionUrl, DeleteFunctionUrl, ReadFunctionUrl, UpdateFunctionUrl,
};
use crate::operations::layer_permission::{
    AddLayerPermission, ReadLayerPermission, RemoveLayerPermission,
};
use crate::operations::layer_version::{DeleteLayerVersion, PublishLayerVersion, ReadLayerVersion};
use crate::operations::tags::{ReadTags, TagResource, UntagResource};
use crate::operations::version::{DeleteVersion, PublishVersion, ReadVersion};

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_kinds {
    ($(
        $variant:ident => $type_name:expr,
        computed: [$($computed:expr),* $(,)?],
        immutable: [$($immutable:expr),* $(,)?],
        taggable: $taggable:expr;
    )*) => {
        /// A resource kind the provider manages
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum LambdaResource {
            $($variant,)*
        }

        impl LambdaResource {
            pub const ALL: &'static [LambdaResource] = &[$(LambdaResource::$variant,)*];

            pub fn type_name(self) -> &'static str {
                match self {
                    $(LambdaResource::$variant => $type_name,)*
                }
            }

            /// Attributes the API assigns; restored into the context when resuming
            pub fn computed_attributes(self) -> &'static [&'static str] {
                match self {
                    $(LambdaResource::$variant => &[$($computed),*],)*
                }
            }

            /// Top-level fields whose change forces delete and recreate
            pub fn immutable_fields(self) -> &'static [&'static str] {
                match self {
                    $(LambdaResource::$variant => &[$($immutable),*],)*
                }
            }

            /// Whether the kind carries a `tags` map set through TagResource
            pub fn taggable(self) -> bool {
                match self {
                    $(LambdaResource::$variant => $taggable,)*
                }
            }
        }
    };
}

define_resource_kinds! {
    Alias => "lambda.alias",
        computed: ["aliasArn", "revisionId"],
        immutable: ["functionName", "name"],
        taggable: false;
    EventSourceMapping => "lambda.event_source_mapping",
        computed: [
            "uuid",
            "eventSourceMappingArn",
            "functionArn",
            "state",
            "stateTransitionReason",
            "lastModified",
        ],
        immutable: ["eventSourceArn", "startingPosition", "topics", "queues"],
        taggable: true;
    EventInvokeConfig => "lambda.event_invoke_config",
        computed: ["functionArn", "lastModified"],
        immutable: ["functionName", "qualifier"],
        taggable: false;
    FunctionUrl => "lambda.function_url",
        computed: ["functionUrl", "functionArn", "creationTime", "lastModifiedTime"],
        immutable: ["functionName", "qualifier"],
        taggable: false;
    Version => "lambda.version",
        computed: ["version", "functionArn", "lastModified", "state"],
        immutable: ["functionName", "codeSha256", "description"],
        taggable: false;
    LayerVersion => "lambda.layer_version",
        computed: ["layerArn", "layerVersionArn", "version", "createdDate"],
        immutable: [
            "layerName",
            "description",
            "content",
            "compatibleRuntimes",
            "compatibleArchitectures",
            "licenseInfo",
        ],
        taggable: false;
    LayerVersionPermission => "lambda.layer_version_permission",
        computed: ["statement", "revisionId"],
        immutable: ["layerVersionArn", "statementId", "action", "principal", "organizationId"],
        taggable: false;
    CodeSigningConfig => "lambda.code_signing_config",
        computed: ["codeSigningConfigArn", "codeSigningConfigId", "lastModified"],
        immutable: [],
        taggable: true;
}

impl LambdaResource {
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.type_name() == type_name)
    }

    /// Save operations for `action`, in the order they run
    pub fn sequence(self, action: ResourceAction) -> Sequence<LambdaClient> {
        use LambdaResource::*;
        use ResourceAction::*;

        let seq = Sequence::new(action);
        match (self, action) {
            (Alias, Create) => seq
                .then(CreateAlias::default())
                .then(PutProvisionedConcurrency::new(Create, Source::Field("$.name"))),
            (Alias, Update) => seq
                .then(UpdateAlias::default())
                .then(PutProvisionedConcurrency::new(Update, Source::Field("$.name")))
                .then(DeleteProvisionedConcurrency::new(Source::Field("$.name"))),
            (Alias, Delete) => seq.then(DeleteAlias::default()),
            (Alias, Read) => seq.then(ReadAlias::default()),

            (EventSourceMapping, Create) => seq
                .then(CreateEventSourceMapping::default())
                .then(TagResource::new(Create, MAPPING_ARN)),
            (EventSourceMapping, Update) => seq
                .then(UpdateEventSourceMapping::default())
                .then(TagResource::new(Update, MAPPING_ARN))
                .then(UntagResource::new(MAPPING_ARN)),
            (EventSourceMapping, Delete) => seq.then(DeleteEventSourceMapping::default()),
            (EventSourceMapping, Read) => seq
                .then(ReadEventSourceMapping::default())
                .then(ReadTags::new(MAPPING_ARN)),

            (EventInvokeConfig, Create) => seq.then(PutEventInvokeConfig::default()),
            (EventInvokeConfig, Update) => seq.then(UpdateEventInvokeConfig::default()),
            (EventInvokeConfig, Delete) => seq.then(DeleteEventInvokeConfig::default()),
            (EventInvokeConfig, Read) => seq.then(ReadEventInvokeConfig::default()),

            (FunctionUrl, Create) => seq.then(CreateFunctionUrl::default()),
            (FunctionUrl, Update) => seq.then(UpdateFunctionUrl::default()),
            (FunctionUrl, Delete) => seq.then(DeleteFunctionUrl::default()),
            (FunctionUrl, Read) => seq.then(ReadFunctionUrl::default()),

            (Version, Create) => seq
                .then(PublishVersion::default())
                .then(PutProvisionedConcurrency::new(Create, VERSION)),
            (Version, Update) => seq
                .then(PutProvisionedConcurrency::new(Update, VERSION))
                .then(DeleteProvisionedConcurrency::new(VERSION)),
            (Version, Delete) => seq.then(DeleteVersion::default()),
            (Version, Read) => seq.then(ReadVersion::default()),

            (LayerVersion, Create) => seq.then(PublishLayerVersion::default()),
            (LayerVersion, Delete) => seq.then(DeleteLayerVersion::default()),
            (LayerVersion, Read) => seq.then(ReadLayerVersion::default()),

            (LayerVersionPermission, Create) => seq.then(AddLayerPermission::default()),
            (LayerVersionPermission, Delete) => seq.then(RemoveLayerPermission::default()),
            (LayerVersionPermission, Read) => seq.then(ReadLayerPermission::default()),

            (CodeSigningConfig, Create) => seq
                .then(CreateCodeSigningConfig::default())
                .then(TagResource::new(Create, Source::Upstream)),
            (CodeSigningConfig, Update) => seq
                .then(UpdateCodeSigningConfig::default())
                .then(TagResource::new(Update, Source::Upstream))
                .then(UntagResource::new(Source::Upstream)),
            (CodeSigningConfig, Delete) => seq.then(DeleteCodeSigningConfig::default()),
            (CodeSigningConfig, Read) => seq
                .then(ReadCodeSigningConfig::default())
                .then(ReadTags::new(Source::Upstream)),

            // Every field is immutable; changes go through replacement
            (LayerVersion | LayerVersionPermission, Update) => seq,
        }
    }
}

const MAPPING_ARN: Source = Source::Context("eventSourceMappingArn");
const VERSION: Source = Source::Context("version");

impl ResourceType for LambdaResource {
    fn name(&self) -> &'static str {
        self.type_name()
    }

    fn computed_attributes(&self) -> &'static [&'static str] {
        LambdaResource::computed_attributes(*self)
    }

    fn immutable_fields(&self) -> &'static [&'static str] {
        LambdaResource::immutable_fields(*self)
    }
}

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    LambdaResource::ALL
        .iter()
        .map(|r| Box::new(*r) as Box<dyn ResourceType>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_name() {
        assert_eq!(
            LambdaResource::from_type_name("lambda.alias"),
            Some(LambdaResource::Alias)
        );
        assert_eq!(
            LambdaResource::from_type_name("lambda.code_signing_config"),
            Some(LambdaResource::CodeSigningConfig)
        );
        assert_eq!(LambdaResource::from_type_name("lambda.function"), None);
        assert_eq!(resource_types().len(), 8);
    }

    #[test]
    fn test_every_kind_reads_and_deletes() {
        for kind in LambdaResource::ALL {
            assert!(!kind.sequence(ResourceAction::Read).is_empty(), "{:?}", kind);
            assert!(!kind.sequence(ResourceAction::Delete).is_empty(), "{:?}", kind);
            assert!(!kind.sequence(ResourceAction::Create).is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_sequence_order() {
        assert_eq!(
            LambdaResource::Alias.sequence(ResourceAction::Update).names(),
            vec![
                "update alias",
                "put provisioned concurrency",
                "delete provisioned concurrency"
            ]
        );
        assert_eq!(
            LambdaResource::EventSourceMapping
                .sequence(ResourceAction::Create)
                .names(),
            vec!["create event source mapping", "tag resource"]
        );
        assert!(
            LambdaResource::LayerVersion
                .sequence(ResourceAction::Update)
                .is_empty()
        );
    }

    #[test]
    fn test_taggable_kinds_declare_tag_operations() {
        for kind in LambdaResource::ALL {
            let names = kind.sequence(ResourceAction::Update).names();
            assert_eq!(names.contains(&"tag resource"), kind.taggable(), "{:?}", kind);
        }
    }

    #[test]
    fn test_immutable_fields_are_not_computed() {
        for kind in LambdaResource::ALL {
            for field in kind.immutable_fields() {
                assert!(!kind.computed_attributes().contains(field), "{:?}", kind);
            }
        }
    }
}
