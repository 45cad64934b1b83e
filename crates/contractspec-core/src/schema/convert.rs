//! Conversion between OpenAPI schemas and the canonical [`SchemaModel`].
//!
//! Schemas reaching this module are expected to be dereferenced already;
//! any `$ref` still present could not be resolved and degrades to
//! [`FieldType::Unknown`].

use serde_json::{json, Map, Value as JsonValue};

use super::scalar::lookup_scalar;
use super::{FieldType, ScalarType, SchemaField, SchemaModel};
use crate::openapi::ref_of;
use crate::utils::to_upper_camel_case;

/// Structural classification of one schema node
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Object with declared properties, in document order
    Object {
        properties: Vec<(String, JsonValue)>,
        required: Vec<String>,
    },
    /// Array; holds the `items` schema (`{}` when absent)
    Array(JsonValue),
    Enum(Vec<String>),
    Scalar(ScalarType),
    /// Unmappable shape, with the unresolved `$ref` if that was the cause
    Unknown(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
    pub shape: Shape,
    /// 3.0 `nullable: true`, a 3.1 `"null"` type member or a null enum value
    pub nullable: bool,
    pub description: Option<String>,
}

/// Classify a schema node.
///
/// `allOf` members are merged into a single object; `oneOf`/`anyOf` are
/// unknown unless they only pair one schema with `null`.
pub fn inspect(schema: &JsonValue) -> SchemaInfo {
    let description = schema
        .get("description")
        .and_then(|d| d.as_str())
        .map(String::from);

    if let Some(reference) = ref_of(schema) {
        return SchemaInfo {
            shape: Shape::Unknown(Some(reference.to_string())),
            nullable: false,
            description,
        };
    }

    if let Some(members) = schema.get("allOf").and_then(|v| v.as_array()) {
        return inspect_all_of(schema, members, description);
    }

    for key in ["oneOf", "anyOf"] {
        if let Some(members) = schema.get(key).and_then(|v| v.as_array()) {
            let non_null: Vec<&JsonValue> = members.iter().filter(|m| !is_null_schema(m)).collect();
            if non_null.len() == 1 && non_null.len() < members.len() {
                let mut inner = inspect(non_null[0]);
                inner.nullable = true;
                inner.description = description.or(inner.description);
                return inner;
            }
            return SchemaInfo {
                shape: Shape::Unknown(None),
                nullable: false,
                description,
            };
        }
    }

    let (ty, mut nullable) = declared_type(schema);
    if schema.get("nullable").and_then(|n| n.as_bool()) == Some(true) {
        nullable = true;
    }

    if let Some(values) = schema.get("enum").and_then(|v| v.as_array()) {
        let mut names = Vec::with_capacity(values.len());
        for value in values {
            match value {
                JsonValue::Null => nullable = true,
                JsonValue::String(s) => names.push(s.clone()),
                other => names.push(other.to_string()),
            }
        }
        return SchemaInfo {
            shape: Shape::Enum(names),
            nullable,
            description,
        };
    }

    let has_properties = schema.get("properties").map_or(false, |p| p.is_object());
    let shape = match ty.as_deref() {
        Some("object") | None if has_properties => object_shape(schema),
        Some("array") => Shape::Array(schema.get("items").cloned().unwrap_or_else(|| json!({}))),
        None if schema.get("items").is_some() => {
            Shape::Array(schema.get("items").cloned().unwrap_or_else(|| json!({})))
        }
        Some(ty) => {
            let format = schema.get("format").and_then(|f| f.as_str());
            lookup_scalar(ty, format)
                .map(Shape::Scalar)
                .unwrap_or(Shape::Unknown(None))
        }
        None => Shape::Unknown(None),
    };

    SchemaInfo {
        shape,
        nullable,
        description,
    }
}

fn inspect_all_of(schema: &JsonValue, members: &[JsonValue], description: Option<String>) -> SchemaInfo {
    let own_properties = schema.get("properties").map_or(false, |p| p.is_object());
    if members.len() == 1 && !own_properties {
        let mut inner = inspect(&members[0]);
        inner.description = description.or(inner.description);
        return inner;
    }

    let mut properties: Vec<(String, JsonValue)> = Vec::new();
    let mut required: Vec<String> = Vec::new();
    let mut absorb = |shape: Shape| {
        if let Shape::Object {
            properties: more,
            required: more_required,
        } = shape
        {
            for (name, prop) in more {
                if !properties.iter().any(|(existing, _)| *existing == name) {
                    properties.push((name, prop));
                }
            }
            for name in more_required {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
    };

    if own_properties {
        absorb(object_shape(schema));
    }
    for member in members {
        absorb(inspect(member).shape);
    }

    let shape = if properties.is_empty() {
        Shape::Unknown(None)
    } else {
        Shape::Object {
            properties,
            required,
        }
    };
    SchemaInfo {
        shape,
        nullable: schema.get("nullable").and_then(|n| n.as_bool()) == Some(true),
        description,
    }
}

fn object_shape(schema: &JsonValue) -> Shape {
    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), prop.clone()))
                .collect()
        })
        .unwrap_or_default();
    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    Shape::Object {
        properties,
        required,
    }
}

/// The declared `type`, handling 3.1 type arrays.
///
/// Returns the single non-null type and whether `"null"` was listed. A type
/// array with several non-null members yields `"mixed"`, which maps to
/// nothing.
fn declared_type(schema: &JsonValue) -> (Option<String>, bool) {
    match schema.get("type") {
        Some(JsonValue::String(ty)) => (Some(ty.clone()), false),
        Some(JsonValue::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(|t| t.as_str()).collect();
            let nullable = names.contains(&"null");
            let concrete: Vec<&str> = names.into_iter().filter(|t| *t != "null").collect();
            match concrete.as_slice() {
                [] => (None, nullable),
                [single] => (Some(single.to_string()), nullable),
                _ => (Some("mixed".to_string()), nullable),
            }
        }
        _ => (None, false),
    }
}

fn is_null_schema(schema: &JsonValue) -> bool {
    schema.get("type").and_then(|t| t.as_str()) == Some("null")
        || schema.get("enum") == Some(&json!([null]))
}

/// Build the canonical model for a schema.
///
/// Objects become one field per property. Anything else is wrapped in a
/// single field: `items` for arrays, `value` otherwise. Nested objects are
/// named `<Parent><Property>`.
pub fn to_schema_model(schema: &JsonValue, name: &str) -> SchemaModel {
    let info = inspect(schema);
    let mut model = SchemaModel::new(name);
    model.description = info.description.clone();

    match &info.shape {
        Shape::Object {
            properties,
            required,
        } => {
            for (prop, prop_schema) in properties {
                let field = to_schema_field(prop_schema, required.contains(prop), name, prop);
                model.fields.insert(prop.clone(), field);
            }
        }
        Shape::Array(_) => {
            model.fields.insert("items".to_string(), to_schema_field(schema, true, name, "items"));
        }
        _ => {
            model.fields.insert("value".to_string(), to_schema_field(schema, true, name, "value"));
        }
    }
    model
}

/// Canonical field for one property schema; nested objects are named
/// `<parent><Property>`
pub fn to_schema_field(schema: &JsonValue, required: bool, parent: &str, property: &str) -> SchemaField {
    let info = inspect(schema);
    let nested_name = format!("{}{}", parent, to_upper_camel_case(property));
    let (field_type, is_array) = match info.shape {
        Shape::Array(ref items) => (element_type(inspect(items).shape, items, &nested_name), true),
        shape => (element_type(shape, schema, &nested_name), false),
    };
    let field = SchemaField::new(field_type, !required)
        .nullable(info.nullable)
        .with_description(info.description);
    if is_array {
        field.array()
    } else {
        field
    }
}

fn element_type(shape: Shape, schema: &JsonValue, nested_name: &str) -> FieldType {
    match shape {
        Shape::Object { .. } => FieldType::Model(to_schema_model(schema, nested_name)),
        Shape::Enum(values) => FieldType::Enum(values),
        Shape::Scalar(scalar) => FieldType::Scalar(scalar),
        Shape::Unknown(reference) => FieldType::Unknown { reference },
        Shape::Array(_) => FieldType::Unknown { reference: None },
    }
}

/// Rebuild a JSON Schema object from a canonical model
pub fn to_json_schema(model: &SchemaModel) -> JsonValue {
    let mut properties = Map::new();
    for (name, field) in &model.fields {
        properties.insert(name.clone(), field_json_schema(field));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    if let Some(description) = &model.description {
        schema.insert("description".to_string(), json!(description));
    }
    schema.insert("properties".to_string(), JsonValue::Object(properties));
    let required = model.required_fields();
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    JsonValue::Object(schema)
}

/// JSON Schema for a single field, arrays included
pub fn field_json_schema(field: &SchemaField) -> JsonValue {
    let element = match &field.field_type {
        FieldType::Scalar(scalar) => {
            let (ty, format) = scalar.json_schema_type();
            match format {
                Some(format) => json!({"type": ty, "format": format}),
                None => json!({"type": ty}),
            }
        }
        FieldType::Enum(values) => json!({"type": "string", "enum": values}),
        FieldType::Model(model) => to_json_schema(model),
        FieldType::Unknown { .. } => json!({}),
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
        map.insert("description".to_string(), json!(description));
    }
    schema
}

/// Widen a schema to also accept `null`, 3.1 style
pub fn with_null(mut schema: JsonValue) -> JsonValue {
    let ty = schema.get("type").and_then(|t| t.as_str()).map(str::to_string);
    match (ty, schema.as_object_mut()) {
        (Some(ty), Some(map)) => {
            map.insert("type".to_string(), json!([ty, "null"]));
            if let Some(JsonValue::Array(values)) = map.get_mut("enum") {
                values.push(JsonValue::Null);
            }
            schema
        }
        (None, Some(map)) if map.is_empty() => schema,
        _ => json!({"anyOf": [schema, {"type": "null"}]}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_and_optional_fields() {
        let model = to_schema_model(
            &json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "limit": {"type": "integer"}
                },
                "required": ["id"]
            }),
            "ListInput",
        );
        assert!(!model.fields["id"].is_optional);
        assert!(model.fields["limit"].is_optional);
        assert_eq!(model.fields["id"].field_type, FieldType::Scalar(ScalarType::Id));
        assert_eq!(model.required_fields(), vec!["id"]);
    }

    #[test]
    fn test_nullable_variants_accept_absence() {
        let model = to_schema_model(
            &json!({
                "type": "object",
                "properties": {
                    "legacy": {"type": "string", "nullable": true},
                    "modern": {"type": ["string", "null"]},
                    "wrapped": {"anyOf": [{"type": "integer"}, {"type": "null"}]}
                },
                "required": ["legacy", "modern", "wrapped"]
            }),
            "Nulls",
        );
        for name in ["legacy", "modern", "wrapped"] {
            let field = &model.fields[name];
            assert!(field.is_nullable, "{} should be nullable", name);
            assert!(field.accepts_absent(), "{} should accept absence", name);
            assert!(!field.is_optional, "{} is still declared required", name);
        }
        assert_eq!(model.fields["wrapped"].field_type, FieldType::Scalar(ScalarType::Int));
    }

    #[test]
    fn test_required_nullable_survives_json_schema_round_trip() {
        let source = json!({
            "type": "object",
            "properties": {
                "note": {"type": "string", "nullable": true},
                "tags": {"type": ["array", "null"], "items": {"type": "string"}},
                "hint": {"type": "string"}
            },
            "required": ["note", "tags"]
        });
        let model = to_schema_model(&source, "Memo");
        let rebuilt = to_json_schema(&model);
        assert_eq!(rebuilt["required"], json!(["note", "tags"]));
        assert_eq!(rebuilt["properties"]["note"]["type"], json!(["string", "null"]));
        assert_eq!(rebuilt["properties"]["hint"]["type"], json!("string"));

        let again = to_schema_model(&rebuilt, "Memo");
        assert_eq!(again, model);
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let model = to_schema_model(
            &json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "object",
                        "properties": {"street": {"type": "string"}}
                    },
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "matrix": {"type": "array", "items": {"type": "array", "items": {"type": "integer"}}}
                }
            }),
            "Widget",
        );
        match &model.fields["address"].field_type {
            FieldType::Model(nested) => {
                assert_eq!(nested.name, "WidgetAddress");
                assert!(nested.fields.contains_key("street"));
            }
            other => panic!("expected nested model, got {:?}", other),
        }
        assert!(model.fields["tags"].is_array);
        assert_eq!(model.fields["tags"].field_type, FieldType::Scalar(ScalarType::String));
        assert_eq!(model.fields["matrix"].field_type, FieldType::Unknown { reference: None });
    }

    #[test]
    fn test_all_of_merges_properties_and_required() {
        let info = inspect(&json!({
            "allOf": [
                {"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]},
                {"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}
            ]
        }));
        match info.shape {
            Shape::Object {
                properties,
                required,
            } => {
                let names: Vec<&str> = properties.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["id", "name"]);
                assert_eq!(required, vec!["id".to_string(), "name".to_string()]);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_unmappable_shapes_degrade_to_unknown() {
        let one_of = inspect(&json!({"oneOf": [{"type": "string"}, {"type": "integer"}]}));
        assert_eq!(one_of.shape, Shape::Unknown(None));

        let dangling = inspect(&json!({"$ref": "other.yaml#/Pet"}));
        assert_eq!(dangling.shape, Shape::Unknown(Some("other.yaml#/Pet".to_string())));
    }

    #[test]
    fn test_non_object_root_is_wrapped() {
        let model = to_schema_model(&json!({"type": "array", "items": {"type": "string"}}), "Names");
        assert!(model.fields["items"].is_array);
        let scalar = to_schema_model(&json!({"type": "boolean"}), "Flag");
        assert_eq!(scalar.fields["value"].field_type, FieldType::Scalar(ScalarType::Boolean));
    }

    #[test]
    fn test_json_schema_inverse() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "format": "uuid"},
                "status": {"type": "string", "enum": ["active", "archived"]},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["id"]
        });
        let rebuilt = to_json_schema(&to_schema_model(&schema, "Widget"));
        assert_eq!(rebuilt, schema);
    }
}
