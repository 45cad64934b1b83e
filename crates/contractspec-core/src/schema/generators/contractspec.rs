//! ContractSpec's own declarative schema format.
//!
//! Every nested object and enum becomes its own `export const`, declared
//! before the model that uses it.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{is_identifier, review_note, GeneratedField, GeneratedModel, Hoister, OperationContext, SchemaGenerator};
use crate::contract::OpKind;
use crate::schema::convert::{to_schema_field, to_schema_model};
use crate::schema::{FieldType, GeneratorFormat, ScalarType, SchemaField, SchemaModel};
use crate::templates::{self, ts_string};
use crate::utils::to_upper_camel_case;
use crate::Result;

const SCHEMA_PACKAGE: &str = "@contractspec/lib.schema";
const CONTRACTS_PACKAGE: &str = "@contractspec/lib.contracts";

#[derive(Debug, Clone, Copy, Default)]
pub struct ContractSpecGenerator;

#[derive(Default)]
struct Emission {
    hoister: Hoister,
    uses_enum: bool,
}

#[derive(Serialize)]
struct OperationView {
    imports: Vec<String>,
    models: Vec<String>,
    export_name: String,
    define_fn: &'static str,
    name: String,
    version: u32,
    stability: String,
    description: Option<String>,
    goal: Option<String>,
    owners: Vec<String>,
    tags: Vec<String>,
    auth: String,
    method: String,
    path: String,
    input: String,
    output: String,
}

impl ContractSpecGenerator {
    fn scalar(scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::String => "ScalarTypeEnum.String_unsecure()",
            ScalarType::Int => "ScalarTypeEnum.Int_unsecure()",
            ScalarType::Float => "ScalarTypeEnum.Float_unsecure()",
            ScalarType::Boolean => "ScalarTypeEnum.Boolean()",
            ScalarType::Date => "ScalarTypeEnum.Date()",
            ScalarType::DateTime => "ScalarTypeEnum.DateTime()",
            ScalarType::Time => "ScalarTypeEnum.Time()",
            ScalarType::Id => "ScalarTypeEnum.ID()",
            ScalarType::Email => "ScalarTypeEnum.EmailAddress()",
            ScalarType::Url => "ScalarTypeEnum.URL()",
            ScalarType::Json => "ScalarTypeEnum.JSON()",
        }
    }

    /// Declare `model` after everything it references; returns its name
    fn emit_model(&self, model: &SchemaModel, out: &mut Emission) -> (String, Vec<GeneratedField>) {
        let name = out.hoister.claim(&model.name);
        let fields: Vec<GeneratedField> = model
            .fields
            .iter()
            .map(|(field_name, field)| self.emit_field(&name, field_name, field, out))
            .collect();

        let mut code = format!(
            "export const {} = defineSchemaModel({{\n  name: {},\n",
            name,
            ts_string(&name)
        );
        if let Some(description) = &model.description {
            code.push_str(&format!("  description: {},\n", ts_string(description)));
        }
        code.push_str("  fields: {\n");
        for field in &fields {
            code.push_str(&format!("    {}\n", field.code));
        }
        code.push_str("  },\n});\n");

        out.hoister.hoist(name.clone(), code);
        (name, fields)
    }

    fn emit_field(&self, parent: &str, field_name: &str, field: &SchemaField, out: &mut Emission) -> GeneratedField {
        let mut note = None;
        let type_name = match &field.field_type {
            FieldType::Scalar(scalar) => Self::scalar(*scalar).to_string(),
            FieldType::Enum(values) => {
                out.uses_enum = true;
                let enum_name = out
                    .hoister
                    .claim(&format!("{}{}", parent, to_upper_camel_case(field_name)));
                let members: Vec<String> = values.iter().map(|v| ts_string(v)).collect();
                let code = format!(
                    "export const {} = defineEnum({}, [{}]);\n",
                    enum_name,
                    ts_string(&enum_name),
                    members.join(", ")
                );
                out.hoister.hoist(enum_name.clone(), code);
                enum_name
            }
            FieldType::Model(nested) => self.emit_model(nested, out).0,
            FieldType::Unknown { reference } => {
                note = Some(review_note(reference.as_deref()));
                Self::scalar(ScalarType::Json).to_string()
            }
        };

        let key = if is_identifier(field_name) {
            field_name.to_string()
        } else {
            ts_string(field_name)
        };
        let mut code = format!(
            "{}: {{ type: {}, isOptional: {}",
            key, type_name, field.accepts_absent()
        );
        if field.is_array {
            code.push_str(", isArray: true");
        }
        if let Some(description) = &field.description {
            code.push_str(&format!(", description: {}", ts_string(description)));
        }
        code.push_str(" },");
        if let Some(note) = note {
            code.push_str(&format!(" // {}", note));
        }

        GeneratedField {
            name: field_name.to_string(),
            type_name,
            required: !field.accepts_absent(),
            code,
        }
    }

    fn imports(uses_enum: bool) -> String {
        let names = if uses_enum {
            "defineEnum, defineSchemaModel, ScalarTypeEnum"
        } else {
            "defineSchemaModel, ScalarTypeEnum"
        };
        format!("import {{ {} }} from '{}';", names, SCHEMA_PACKAGE)
    }
}

impl SchemaGenerator for ContractSpecGenerator {
    fn format(&self) -> GeneratorFormat {
        GeneratorFormat::ContractSpec
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn generate_model(&self, schema: &JsonValue, name: &str) -> GeneratedModel {
        let model = to_schema_model(schema, name);
        let mut out = Emission::default();
        let (name, fields) = self.emit_model(&model, &mut out);
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
            imports: vec![Self::imports(out.uses_enum)],
            hoisted,
        }
    }

    fn generate_field(&self, schema: &JsonValue, field_name: &str, required: bool) -> String {
        let field = to_schema_field(schema, required, "", field_name);
        let mut out = Emission::default();
        self.emit_field("", field_name, &field, &mut out).code
    }

    fn render_operation(&self, ctx: &OperationContext) -> Result<String> {
        let mut out = Emission::default();
        let input = ctx
            .input_schema
            .as_ref()
            .map(|schema| self.emit_model(&to_schema_model(schema, &ctx.input_model_name()), &mut out).0);
        let output = ctx
            .output_schema
            .as_ref()
            .map(|schema| self.emit_model(&to_schema_model(schema, &ctx.output_model_name()), &mut out).0);

        let meta = &ctx.spec.meta;
        let define_fn = match meta.kind {
            OpKind::Command => "defineCommand",
            OpKind::Query => "defineQuery",
        };
        let view = OperationView {
            imports: vec![
                Self::imports(out.uses_enum),
                format!("import {{ {} }} from '{}';", define_fn, CONTRACTS_PACKAGE),
            ],
            models: out.hoister.blocks,
            export_name: ctx.export_name(),
            define_fn,
            name: ts_string(&meta.name),
            version: meta.version,
            stability: ts_string(meta.stability.as_str()),
            description: meta.description.as_deref().map(ts_string),
            goal: meta.goal.as_deref().map(ts_string),
            owners: meta.owners.iter().map(|o| ts_string(o)).collect(),
            tags: meta.tags.iter().map(|t| ts_string(t)).collect(),
            auth: ts_string(ctx.spec.policy.auth.as_str()),
            method: ts_string(&ctx.method.to_string()),
            path: ts_string(&ctx.path),
            input: input.unwrap_or_else(|| "null".to_string()),
            output: output.unwrap_or_else(|| "null".to_string()),
        };
        templates::render(templates::CONTRACTSPEC_OPERATION, &view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::operation::sample_spec;
    use crate::openapi::HttpMethod;
    use serde_json::json;

    fn widget_schema() -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "format": "uuid"},
                "status": {"type": "string", "enum": ["active", "archived"]},
                "address": {
                    "type": "object",
                    "properties": {"street": {"type": "string"}},
                    "required": ["street"]
                },
                "tags": {"type": "array", "items": {"type": "string"}},
                "extra": {"$ref": "external.yaml#/Extra"}
            },
            "required": ["id"]
        })
    }

    #[test]
    fn test_nested_objects_and_enums_are_hoisted() {
        let model = ContractSpecGenerator.generate_model(&widget_schema(), "Widget");
        assert_eq!(model.name, "Widget");
        assert_eq!(model.hoisted, vec!["WidgetStatus", "WidgetAddress"]);
        let status_at = model.code.find("export const WidgetStatus = defineEnum").unwrap();
        let address_at = model.code.find("export const WidgetAddress = defineSchemaModel").unwrap();
        let widget_at = model.code.find("export const Widget = defineSchemaModel").unwrap();
        assert!(status_at < widget_at && address_at < widget_at);
        assert!(model.imports[0].contains("defineEnum"));
    }

    #[test]
    fn test_field_flags_and_placeholders() {
        let model = ContractSpecGenerator.generate_model(&widget_schema(), "Widget");
        let field = |name: &str| model.fields.iter().find(|f| f.name == name).unwrap();
        assert_eq!(field("id").code, "id: { type: ScalarTypeEnum.ID(), isOptional: false },");
        assert!(field("tags").code.contains("isArray: true"));
        assert!(field("extra").code.contains("needs manual review"));
        assert!(field("extra").code.contains("external.yaml#/Extra"));
        assert!(!field("extra").required);
    }

    #[test]
    fn test_hoisted_name_collision_gets_suffix() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"type": "object", "properties": {"x": {"type": "string"}}},
                "A": {"type": "object", "properties": {"y": {"type": "string"}}}
            }
        });
        let model = ContractSpecGenerator.generate_model(&schema, "Pair");
        assert_eq!(model.hoisted, vec!["PairA", "PairA2"]);
    }

    #[test]
    fn test_generate_field_quotes_non_identifiers() {
        let code = ContractSpecGenerator.generate_field(&json!({"type": "string"}), "x-trace-id", false);
        assert_eq!(code, "'x-trace-id': { type: ScalarTypeEnum.String_unsecure(), isOptional: true },");
    }

    #[test]
    fn test_render_operation() {
        let mut spec = sample_spec("widgets.getWidget", OpKind::Query);
        spec.meta.description = Some("Fetch one widget".into());
        spec.meta.tags = vec!["widgets".into()];
        let ctx = OperationContext {
            spec,
            method: HttpMethod::Get,
            path: "/widgets/{id}".into(),
            input_schema: Some(json!({
                "type": "object",
                "properties": {"id": {"type": "string"}},
                "required": ["id"]
            })),
            output_schema: Some(widget_schema()),
        };
        let code = ContractSpecGenerator.render_operation(&ctx).unwrap();
        assert!(code.contains("import { defineQuery } from '@contractspec/lib.contracts';"));
        assert!(code.contains("export const widgetsGetWidgetSpec = defineQuery({"));
        assert!(code.contains("input: WidgetsGetWidgetInput,"));
        assert!(code.contains("output: WidgetsGetWidgetOutput,"));
        assert!(code.contains("rest: { method: 'GET', path: '/widgets/{id}' },"));
        assert!(code.contains("description: 'Fetch one widget',"));
        assert!(code.contains("tags: ['widgets'],"));
    }
}
