//! Canonical, dialect-independent schema model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalar types every generator knows how to spell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    Id,
    Email,
    Url,
    /// Free-form object or any value with no better mapping
    Json,
}

impl ScalarType {
    /// JSON Schema `type` and optional `format` for this scalar
    pub fn json_schema_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::String => ("string", None),
            Self::Int => ("integer", None),
            Self::Float => ("number", None),
            Self::Boolean => ("boolean", None),
            Self::Date => ("string", Some("date")),
            Self::DateTime => ("string", Some("date-time")),
            Self::Time => ("string", Some("time")),
            Self::Id => ("string", Some("uuid")),
            Self::Email => ("string", Some("email")),
            Self::Url => ("string", Some("uri")),
            Self::Json => ("object", None),
        }
    }
}

/// What a field holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "camelCase")]
pub enum FieldType {
    Scalar(ScalarType),
    Enum(Vec<String>),
    Model(SchemaModel),
    /// Shape that could not be mapped; `reference` keeps an unresolved `$ref`
    Unknown { reference: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub field_type: FieldType,
    /// Absent from the source's `required` list
    pub is_optional: bool,
    pub is_array: bool,
    /// Source accepts `null`; kept apart from `is_optional` so a required
    /// nullable property survives a round trip
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaField {
    pub fn new(field_type: FieldType, is_optional: bool) -> Self {
        Self {
            field_type,
            is_optional,
            is_array: false,
            is_nullable: false,
            description: None,
        }
    }

    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Whether generated code lets the value be left out; null maps to absent
    pub fn accepts_absent(&self) -> bool {
        self.is_optional || self.is_nullable
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// A named object schema with ordered fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, SchemaField>,
}

impl SchemaModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Names of the fields that are not optional, in declaration order
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.is_optional)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
