//! Schema conversion: the canonical field model, the OpenAPI converter and
//! the per-dialect code generators.

pub mod convert;
mod format;
pub mod generators;
mod model;
mod scalar;

pub use format::GeneratorFormat;
pub use generators::{
    create_generator, GeneratedField, GeneratedModel, OperationContext, SchemaGenerator,
};
pub use model::{FieldType, ScalarType, SchemaField, SchemaModel};
pub use scalar::lookup_scalar;
