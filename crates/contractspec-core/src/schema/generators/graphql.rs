//! GraphQL SDL. Nested objects and enums are hoisted into named types.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{review_note, GeneratedField, GeneratedModel, Hoister, OperationContext, SchemaGenerator};
use crate::contract::OpKind;
use crate::schema::convert::{to_schema_field, to_schema_model};
use crate::schema::{FieldType, GeneratorFormat, ScalarType, SchemaField, SchemaModel};
use crate::templates::{self, graphql_string};
use crate::utils::{to_lower_camel_case, to_snake_case, to_upper_camel_case};
use crate::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKeyword {
    Type,
    Input,
}

impl TypeKeyword {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Input => "input",
        }
    }
}

#[derive(Default)]
struct Emission {
    hoister: Hoister,
    /// Custom scalars that must be declared
    scalars: BTreeSet<&'static str>,
}

#[derive(Serialize)]
struct OperationView {
    imports: Vec<String>,
    models: Vec<String>,
    root_type: &'static str,
    description: Option<String>,
    field_name: String,
    input: Option<String>,
    output: String,
}

/// Make a valid GraphQL name: `[_A-Za-z][_0-9A-Za-z]*`
fn graphql_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn enum_value(value: &str) -> String {
    graphql_name(&to_snake_case(value).to_uppercase())
}

impl GraphqlGenerator {
    fn scalar(scalar: ScalarType, out: &mut Emission) -> &'static str {
        let (name, custom) = match scalar {
            ScalarType::String | ScalarType::Email | ScalarType::Url => ("String", false),
            ScalarType::Int => ("Int", false),
            ScalarType::Float => ("Float", false),
            ScalarType::Boolean => ("Boolean", false),
            ScalarType::Id => ("ID", false),
            ScalarType::Date => ("Date", true),
            ScalarType::DateTime => ("DateTime", true),
            ScalarType::Time => ("Time", true),
            ScalarType::Json => ("JSON", true),
        };
        if custom {
            out.scalars.insert(name);
        }
        name
    }

    fn emit_model(&self, model: &SchemaModel, keyword: TypeKeyword, out: &mut Emission) -> (String, Vec<GeneratedField>) {
        let name = out.hoister.claim(&graphql_name(&model.name));
        let fields: Vec<GeneratedField> = model
            .fields
            .iter()
            .map(|(field_name, field)| self.emit_field(&name, field_name, field, keyword, out))
            .collect();

        let mut code = String::new();
        if let Some(description) = &model.description {
            code.push_str(&format!("{}\n", graphql_string(description)));
        }
        code.push_str(&format!("{} {} {{\n", keyword.as_str(), name));
        if fields.is_empty() {
            code.push_str("  _empty: Boolean # object declares no properties\n");
        }
        for field in &fields {
            for line in field.code.lines() {
                code.push_str(&format!("  {}\n", line));
            }
        }
        code.push_str("}\n");

        out.hoister.hoist(name.clone(), code);
        (name, fields)
    }

    fn emit_field(
        &self,
        parent: &str,
        field_name: &str,
        field: &SchemaField,
        keyword: TypeKeyword,
        out: &mut Emission,
    ) -> GeneratedField {
        let mut note = None;
        let base = match &field.field_type {
            FieldType::Scalar(scalar) => Self::scalar(*scalar, out).to_string(),
            FieldType::Enum(values) if !values.is_empty() => {
                let enum_name = out
                    .hoister
                    .claim(&format!("{}{}", parent, to_upper_camel_case(field_name)));
                let mut code = format!("enum {} {{\n", enum_name);
                for value in values {
                    code.push_str(&format!("  {}\n", enum_value(value)));
                }
                code.push_str("}\n");
                out.hoister.hoist(enum_name.clone(), code);
                enum_name
            }
            FieldType::Enum(_) => "String".to_string(),
            FieldType::Model(nested) => self.emit_model(nested, keyword, out).0,
            FieldType::Unknown { reference } => {
                note = Some(review_note(reference.as_deref()));
                Self::scalar(ScalarType::Json, out).to_string()
            }
        };

        let mut type_name = if field.is_array {
            format!("[{}!]", base)
        } else {
            base
        };
        if !field.accepts_absent() {
            type_name.push('!');
        }

        let mut code = String::new();
        if let Some(description) = &field.description {
            code.push_str(&format!("{}\n", graphql_string(description)));
        }
        code.push_str(&format!("{}: {}", graphql_name(field_name), type_name));
        if let Some(note) = note {
            code.push_str(&format!(" # {}", note));
        }

        GeneratedField {
            name: field_name.to_string(),
            type_name,
            required: !field.accepts_absent(),
            code,
        }
    }

    fn scalar_declarations(out: &Emission) -> Vec<String> {
        out.scalars.iter().map(|s| format!("scalar {}", s)).collect()
    }
}

impl SchemaGenerator for GraphqlGenerator {
    fn format(&self) -> GeneratorFormat {
        GeneratorFormat::Graphql
    }

    fn file_extension(&self) -> &'static str {
        "graphql"
    }

    fn generate_model(&self, schema: &JsonValue, name: &str) -> GeneratedModel {
        let model = to_schema_model(schema, name);
        let mut out = Emission::default();
        let (name, fields) = self.emit_model(&model, TypeKeyword::Type, &mut out);
        let hoisted = out
            .hoister
            .names
            .iter()
            .filter(|hoisted| **hoisted != name)
            .cloned()
            .collect();
        GeneratedModel {
            name,
            fields,
            code: out.hoister.blocks.join("\n"),
            imports: Self::scalar_declarations(&out),
            hoisted,
        }
    }

    fn generate_field(&self, schema: &JsonValue, field_name: &str, required: bool) -> String {
        let field = to_schema_field(schema, required, "", field_name);
        let mut out = Emission::default();
        self.emit_field("", field_name, &field, TypeKeyword::Type, &mut out).code
    }

    fn render_operation(&self, ctx: &OperationContext) -> Result<String> {
        let mut out = Emission::default();
        let input = ctx.input_schema.as_ref().map(|schema| {
            let model = to_schema_model(schema, &ctx.input_model_name());
            self.emit_model(&model, TypeKeyword::Input, &mut out).0
        });
        let output = ctx.output_schema.as_ref().map(|schema| {
            let model = to_schema_model(schema, &ctx.output_model_name());
            self.emit_model(&model, TypeKeyword::Type, &mut out).0
        });

        let meta = &ctx.spec.meta;
        let view = OperationView {
            imports: Self::scalar_declarations(&out),
            models: out.hoister.blocks,
            root_type: match meta.kind {
                OpKind::Command => "Mutation",
                OpKind::Query => "Query",
            },
            description: meta.description.as_deref().map(graphql_string),
            field_name: graphql_name(&to_lower_camel_case(&meta.name)),
            input,
            output: output.unwrap_or_else(|| "Boolean".to_string()),
        };
        templates::render(templates::GRAPHQL_OPERATION, &view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::operation::sample_spec;
    use crate::openapi::HttpMethod;
    use serde_json::json;

    #[test]
    fn test_types_are_hoisted_with_non_null_markers() {
        let model = GraphqlGenerator.generate_model(
            &json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "createdAt": {"type": "string", "format": "date-time"},
                    "owner": {"type": "object", "properties": {"name": {"type": "string"}}},
                    "labels": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["id", "labels"]
            }),
            "Widget",
        );
        assert_eq!(model.hoisted, vec!["WidgetOwner"]);
        assert_eq!(model.imports, vec!["scalar DateTime"]);
        assert!(model.code.contains("type WidgetOwner {\n  name: String\n}\n"));
        assert!(model.code.contains("  id: ID!\n"));
        assert!(model.code.contains("  labels: [String!]!\n"));
        assert!(model.code.contains("  owner: WidgetOwner\n"));
    }

    #[test]
    fn test_enum_values_and_names_are_sanitized() {
        assert_eq!(enum_value("in-progress"), "IN_PROGRESS");
        assert_eq!(enum_value("2fa"), "_2FA");
        assert_eq!(graphql_name("x-request-id"), "x_request_id");
        let field = GraphqlGenerator.generate_field(&json!({"type": "string", "enum": ["a"]}), "mode", true);
        assert_eq!(field, "mode: Mode!");
    }

    #[test]
    fn test_render_operation_uses_input_types() {
        let ctx = OperationContext {
            spec: sample_spec("widgets.createWidget", OpKind::Command),
            method: HttpMethod::Post,
            path: "/widgets".into(),
            input_schema: Some(json!({
                "type": "object",
                "properties": {"meta": {"type": "object", "properties": {"k": {"type": "string"}}}}
            })),
            output_schema: None,
        };
        let sdl = GraphqlGenerator.render_operation(&ctx).unwrap();
        assert!(sdl.contains("input WidgetsCreateWidgetInputMeta {"));
        assert!(sdl.contains("input WidgetsCreateWidgetInput {"));
        assert!(sdl.contains("extend type Mutation {"));
        assert!(sdl.contains("widgetsCreateWidget(input: WidgetsCreateWidgetInput!): Boolean"));
    }
}
