//! Schema generators, one per output dialect, behind a common trait.
pub mod contractspec;
pub mod graphql;
pub mod json_schema;
pub mod zod;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::GeneratorFormat;
use crate::contract::OperationSpec;
use crate::openapi::HttpMethod;
use crate::utils::{to_lower_camel_case, to_upper_camel_case};
use crate::Result;

/// One rendered field of a generated model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedField {
    pub name: String,
    /// Type as spelled in the target dialect
    pub type_name: String,
    pub required: bool,
    pub code: String,
}

/// Output of one generation pass over a schema
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedModel {
    pub name: String,
    pub fields: Vec<GeneratedField>,
    /// Hoisted declarations followed by the model itself
    pub code: String,
    pub imports: Vec<String>,
    /// Names of the declarations hoisted out of the model
    pub hoisted: Vec<String>,
}

/// Everything a generator needs to render a whole operation file
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub spec: OperationSpec,
    pub method: HttpMethod,
    pub path: String,
    /// Dereferenced input object schema
    pub input_schema: Option<JsonValue>,
    /// Dereferenced output schema
    pub output_schema: Option<JsonValue>,
}

impl OperationContext {
    pub fn input_model_name(&self) -> String {
        format!("{}Input", to_upper_camel_case(&self.spec.meta.name))
    }

    pub fn output_model_name(&self) -> String {
        format!("{}Output", to_upper_camel_case(&self.spec.meta.name))
    }

    /// Identifier of the exported operation value
    pub fn export_name(&self) -> String {
        format!("{}Spec", to_lower_camel_case(&self.spec.meta.name))
    }
}

/// Trait for turning OpenAPI schemas into code in one dialect.
///
/// Generation never fails on schema shape: anything unmappable becomes a
/// placeholder marked for manual review. Only whole-file rendering can fail.
pub trait SchemaGenerator {
    fn format(&self) -> GeneratorFormat;

    /// Extension of generated files, without the dot
    fn file_extension(&self) -> &'static str;

    fn generate_model(&self, schema: &JsonValue, name: &str) -> GeneratedModel;

    /// Code for a single property declaration
    fn generate_field(&self, schema: &JsonValue, field_name: &str, required: bool) -> String;

    fn render_operation(&self, ctx: &OperationContext) -> Result<String>;
}

/// Get the generator for a dialect
pub fn create_generator(format: GeneratorFormat) -> Box<dyn SchemaGenerator> {
    match format {
        GeneratorFormat::ContractSpec => Box::new(contractspec::ContractSpecGenerator),
        GeneratorFormat::Zod => Box::new(zod::ZodGenerator),
        GeneratorFormat::JsonSchema => Box::new(json_schema::JsonSchemaGenerator),
        GeneratorFormat::Graphql => Box::new(graphql::GraphqlGenerator),
    }
}

/// Tracks names claimed during one generation pass and the hoisted
/// declarations, in the order they must be emitted
#[derive(Debug, Default)]
pub(crate) struct Hoister {
    taken: HashSet<String>,
    pub names: Vec<String>,
    pub blocks: Vec<String>,
}

impl Hoister {
    /// Claim `candidate`, or the first free `candidate2`, `candidate3`, ...
    pub fn claim(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{}{}", candidate, n);
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    pub fn hoist(&mut self, name: String, code: String) {
        self.names.push(name);
        self.blocks.push(code);
    }
}

/// Comment text attached to placeholder types
pub(crate) fn review_note(reference: Option<&str>) -> String {
    match reference {
        Some(reference) => format!("unresolved reference {}, needs manual review", reference),
        None => "unsupported schema shape, needs manual review".to_string(),
    }
}

/// Whether a property name can be written bare as a JS identifier
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
