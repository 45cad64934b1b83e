//! Canonical contract model: operation specs, registries and import provenance.

pub mod operation;
pub mod registry;
pub mod source;

pub use operation::{
    AuthLevel, OpKind, OperationIo, OperationSpec, PolicySpec, RestOverride, SpecMeta, Stability,
    TransportOverride,
};
pub use registry::{
    ContractRegistries, DataViewSpec, DescriptorSpec, EventSpec, FeatureSpec, FormSpec,
    OperationRegistry, PresentationSpec, WorkflowSpec,
};
pub use source::{
    GeneratedFile, GraphqlOperationType, ImportedOperationSpec, ParamLocations, SourceKind,
    SourceOrigin, SpecPayload, SpecSource, TransportHints,
};
