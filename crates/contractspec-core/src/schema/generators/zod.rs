//! Zod runtime validators. Nested objects stay inline.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{is_identifier, review_note, GeneratedField, GeneratedModel, OperationContext, SchemaGenerator};
use crate::schema::convert::{to_schema_field, to_schema_model};
use crate::schema::{FieldType, GeneratorFormat, ScalarType, SchemaField, SchemaModel};
use crate::templates::{self, ts_string};
use crate::Result;

const ZOD_IMPORT: &str = "import { z } from 'zod';";

#[derive(Debug, Clone, Copy, Default)]
pub struct ZodGenerator;

#[derive(Serialize)]
struct OperationView {
    models: Vec<String>,
    export_name: String,
    name: String,
    version: u32,
    kind: String,
    stability: String,
    description: Option<String>,
    method: String,
    path: String,
    input: String,
    output: String,
}

impl ZodGenerator {
    fn scalar(scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::String => "z.string()",
            ScalarType::Int => "z.number().int()",
            ScalarType::Float => "z.number()",
            ScalarType::Boolean => "z.boolean()",
            ScalarType::Date => "z.string().date()",
            ScalarType::DateTime => "z.string().datetime()",
            ScalarType::Time => "z.string().time()",
            ScalarType::Id => "z.string().uuid()",
            ScalarType::Email => "z.string().email()",
            ScalarType::Url => "z.string().url()",
            ScalarType::Json => "z.record(z.unknown())",
        }
    }

    /// `z.object({...})` with fields indented one level below `indent`
    fn object_expr(&self, model: &SchemaModel, indent: usize) -> (String, Vec<GeneratedField>) {
        let pad = "  ".repeat(indent + 1);
        let fields: Vec<GeneratedField> = model
            .fields
            .iter()
            .map(|(name, field)| self.field(name, field, indent + 1))
            .collect();
        let mut expr = String::from("z.object({\n");
        for field in &fields {
            expr.push_str(&format!("{}{}\n", pad, field.code));
        }
        expr.push_str(&"  ".repeat(indent));
        expr.push_str("})");
        (expr, fields)
    }

    fn field(&self, name: &str, field: &SchemaField, indent: usize) -> GeneratedField {
        let mut note = None;
        let mut expr = match &field.field_type {
            FieldType::Scalar(scalar) => Self::scalar(*scalar).to_string(),
            FieldType::Enum(values) if values.is_empty() => "z.string()".to_string(),
            FieldType::Enum(values) => {
                let members: Vec<String> = values.iter().map(|v| ts_string(v)).collect();
                format!("z.enum([{}])", members.join(", "))
            }
            FieldType::Model(nested) => self.object_expr(nested, indent).0,
            FieldType::Unknown { reference } => {
                note = Some(review_note(reference.as_deref()));
                "z.unknown()".to_string()
            }
        };
        let type_name = expr.clone();
        if field.is_array {
            expr = format!("z.array({})", expr);
        }
        if field.accepts_absent() {
            expr.push_str(".optional()");
        }
        if let Some(description) = &field.description {
            expr.push_str(&format!(".describe({})", ts_string(description)));
        }

        let key = if is_identifier(name) {
            name.to_string()
        } else {
            ts_string(name)
        };
        let mut code = format!("{}: {},", key, expr);
        if let Some(note) = note {
            code.push_str(&format!(" // {}", note));
        }
        GeneratedField {
            name: name.to_string(),
            type_name,
            required: !field.accepts_absent(),
            code,
        }
    }

    fn declaration(&self, model: &SchemaModel) -> (String, Vec<GeneratedField>) {
        let (expr, fields) = self.object_expr(model, 0);
        let mut code = String::new();
        if let Some(description) = &model.description {
            code.push_str(&format!("/** {} */\n", description.replace("*/", "* /")));
        }
        code.push_str(&format!(
            "export const {name} = {expr};\nexport type {name} = z.infer<typeof {name}>;\n",
            name = model.name,
            expr = expr
        ));
        (code, fields)
    }
}

impl SchemaGenerator for ZodGenerator {
    fn format(&self) -> GeneratorFormat {
        GeneratorFormat::Zod
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn generate_model(&self, schema: &JsonValue, name: &str) -> GeneratedModel {
        let model = to_schema_model(schema, name);
        let (code, fields) = self.declaration(&model);
        GeneratedModel {
            name: model.name,
            fields,
            code,
            imports: vec![ZOD_IMPORT.to_string()],
            hoisted: Vec::new(),
        }
    }

    fn generate_field(&self, schema: &JsonValue, field_name: &str, required: bool) -> String {
        let field = to_schema_field(schema, required, "", field_name);
        self.field(field_name, &field, 0).code
    }

    fn render_operation(&self, ctx: &OperationContext) -> Result<String> {
        let mut models = Vec::new();
        let mut declare = |schema: &Option<JsonValue>, name: String| {
            schema.as_ref().map(|schema| {
                models.push(self.declaration(&to_schema_model(schema, &name)).0);
                name
            })
        };
        let input = declare(&ctx.input_schema, ctx.input_model_name());
        let output = declare(&ctx.output_schema, ctx.output_model_name());

        let meta = &ctx.spec.meta;
        let view = OperationView {
            models,
            export_name: ctx.export_name(),
            name: ts_string(&meta.name),
            version: meta.version,
            kind: ts_string(meta.kind.as_str()),
            stability: ts_string(meta.stability.as_str()),
            description: meta.description.as_deref().map(ts_string),
            method: ts_string(&ctx.method.to_string()),
            path: ts_string(&ctx.path),
            input: input.unwrap_or_else(|| "null".to_string()),
            output: output.unwrap_or_else(|| "null".to_string()),
        };
        templates::render(templates::ZOD_OPERATION, &view)
    }
}
