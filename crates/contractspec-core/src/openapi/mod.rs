//! OpenAPI document loading, `$ref` resolution and operation parsing.

mod document;
mod parser;
mod types;

pub use document::{ref_name, ref_of, DocumentFormat, OpenApiDocument};
pub use parser::parse;
pub use types::*;
