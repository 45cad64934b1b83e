//! Plain JSON Schema (draft 2020-12) documents

use serde_json::{json, Map, Value as JsonValue};

use super::{review_note, GeneratedField, GeneratedModel, OperationContext, SchemaGenerator};
use crate::schema::convert::{field_json_schema, to_schema_field, to_schema_model, with_null};
use crate::schema::{FieldType, GeneratorFormat, SchemaField, SchemaModel};
use crate::Result;

const DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaGenerator;

impl JsonSchemaGenerator {
    fn object_schema(&self, model: &SchemaModel) -> JsonValue {
        let mut properties = Map::new();
        for (name, field) in &model.fields {
            properties.insert(name.clone(), self.field_schema(field));
        }
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if let Some(description) = &model.description {
            schema.insert("description".into(), json!(description));
        }
        schema.insert("properties".into(), JsonValue::Object(properties));
        let required = model.required_fields();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema.insert("additionalProperties".into(), json!(false));
        JsonValue::Object(schema)
    }

    fn field_schema(&self, field: &SchemaField) -> JsonValue {
        let element = match &field.field_type {
            FieldType::Model(nested) => self.object_schema(nested),
            FieldType::Unknown { reference } => {
                json!({"$comment": review_note(reference.as_deref())})
            }
            _ => {
                return field_json_schema(field);
            }
        };
        let mut schema = if field.is_array {
            json!({"type": "array", "items": element})
        } else {
            element
        };
        if field.is_nullable {
            schema = with_null(schema);
        }
        if let (Some(description), Some(map)) = (&field.description, schema.as_object_mut()) {
            map.insert("description".into(), json!(description));
        }
        schema
    }

    fn document(&self, model: &SchemaModel) -> JsonValue {
        let mut doc = Map::new();
        doc.insert("$schema".into(), json!(DIALECT));
        doc.insert("title".into(), json!(model.name));
        if let JsonValue::Object(body) = self.object_schema(model) {
            doc.extend(body);
        }
        JsonValue::Object(doc)
    }

    fn pretty(value: &JsonValue) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl SchemaGenerator for JsonSchemaGenerator {
    fn format(&self) -> GeneratorFormat {
        GeneratorFormat::JsonSchema
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn generate_model(&self, schema: &JsonValue, name: &str) -> GeneratedModel {
        let model = to_schema_model(schema, name);
        let fields = model
            .fields
            .iter()
            .map(|(field_name, field)| {
                let schema = self.field_schema(field);
                let type_name = match &schema["type"] {
                    JsonValue::String(ty) => ty.as_str(),
                    JsonValue::Array(types) => types.first().and_then(|t| t.as_str()).unwrap_or("any"),
                    _ => "any",
                };
                GeneratedField {
                    name: field_name.clone(),
                    type_name: type_name.to_string(),
                    required: !field.is_optional,
                    code: format!("{}: {}", json!(field_name), schema),
                }
            })
            .collect();
        GeneratedModel {
            name: model.name.clone(),
            fields,
            code: Self::pretty(&self.document(&model)),
            imports: Vec::new(),
            hoisted: Vec::new(),
        }
    }

    fn generate_field(&self, schema: &JsonValue, field_name: &str, required: bool) -> String {
        let field = to_schema_field(schema, required, "", field_name);
        format!("{}: {}", json!(field_name), self.field_schema(&field))
    }

    fn render_operation(&self, ctx: &OperationContext) -> Result<String> {
        let meta = &ctx.spec.meta;
        let mut defs = Map::new();
        let mut properties = Map::new();
        for (slot, schema, name) in [
            ("input", &ctx.input_schema, ctx.input_model_name()),
            ("output", &ctx.output_schema, ctx.output_model_name()),
        ] {
            if let Some(schema) = schema {
                let model = to_schema_model(schema, &name);
                defs.insert(name.clone(), self.object_schema(&model));
                properties.insert(slot.to_string(), json!({"$ref": format!("#/$defs/{}", name)}));
            }
        }

        let mut doc = Map::new();
        doc.insert("$schema".into(), json!(DIALECT));
        doc.insert("$id".into(), json!(format!("{}.v{}", meta.name, meta.version)));
        doc.insert("title".into(), json!(meta.name));
        if let Some(description) = &meta.description {
            doc.insert("description".into(), json!(description));
        }
        doc.insert("type".into(), json!("object"));
        doc.insert("properties".into(), JsonValue::Object(properties));
        doc.insert(
            "x-contractspec".into(),
            json!({
                "name": meta.name,
                "version": meta.version,
                "kind": meta.kind,
                "stability": meta.stability,
                "method": ctx.method,
                "path": ctx.path,
            }),
        );
        doc.insert("$defs".into(), JsonValue::Object(defs));

        Ok(format!("{}\n", serde_json::to_string_pretty(&JsonValue::Object(doc))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::operation::sample_spec;
    use crate::contract::OpKind;
    use crate::openapi::HttpMethod;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_model_is_valid_json_schema() {
        let model = JsonSchemaGenerator.generate_model(
            &json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "child": {"type": "object", "properties": {"n": {"type": ["integer", "null"]}}}
                },
                "required": ["id"]
            }),
            "Thing",
        );
        let parsed: JsonValue = serde_json::from_str(&model.code).unwrap();
        assert_eq!(
            parsed,
            json!({
                "$schema": DIALECT,
                "title": "Thing",
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "child": {
                        "type": "object",
                        "properties": {"n": {"type": "integer"}},
                        "additionalProperties": false
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            })
        );
        assert_eq!(model.fields[0].type_name, "string");
    }

    #[test]
    fn test_unknown_field_carries_review_comment() {
        let code = JsonSchemaGenerator.generate_field(&json!({"$ref": "#/missing"}), "x", true);
        assert!(code.starts_with("\"x\": "));
        assert!(code.contains("#/missing"));
    }

    #[test]
    fn test_render_operation_links_defs() {
        let ctx = OperationContext {
            spec: sample_spec("widgets.createWidget", OpKind::Command),
            method: HttpMethod::Post,
            path: "/widgets".into(),
            input_schema: Some(json!({"type": "object", "properties": {"name": {"type": "string"}}})),
            output_schema: None,
        };
        let doc: JsonValue = serde_json::from_str(&JsonSchemaGenerator.render_operation(&ctx).unwrap()).unwrap();
        assert_eq!(doc["properties"]["input"]["$ref"], "#/$defs/WidgetsCreateWidgetInput");
        assert!(doc["properties"].get("output").is_none());
        assert_eq!(doc["x-contractspec"]["method"], "POST");
        assert_eq!(doc["$id"], "widgets.createWidget.v1");
    }
}
