//! Provenance and transport details carried by imported specs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OperationSpec;
use crate::openapi::HttpMethod;

/// Kind of document a spec was imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    OpenApi,
    /// Recognised by the loader, not importable yet
    GraphQl,
    /// Recognised by the loader, not importable yet
    AsyncApi,
    /// Recognised by the loader, not importable yet
    Protobuf,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenApi => "openapi",
            Self::GraphQl => "graphql",
            Self::AsyncApi => "asyncapi",
            Self::Protobuf => "protobuf",
        }
    }

    pub fn is_importable(&self) -> bool {
        matches!(self, Self::OpenApi)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a document came from, before any operation is imported from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOrigin {
    pub kind: SourceKind,
    pub url: Option<String>,
    pub file: Option<String>,
}

/// Immutable provenance record of one imported operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSource {
    kind: SourceKind,
    url: Option<String>,
    file: Option<String>,
    source_id: String,
    imported_at: DateTime<Utc>,
}

impl SpecSource {
    pub fn new(origin: &SourceOrigin, source_id: impl Into<String>, imported_at: DateTime<Utc>) -> Self {
        Self {
            kind: origin.kind,
            url: origin.url.clone(),
            file: origin.file.clone(),
            source_id: source_id.into(),
            imported_at,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Identifier of the operation in its source, e.g. the `operationId`
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn imported_at(&self) -> DateTime<Utc> {
        self.imported_at
    }
}

/// Parameter names of a REST operation, by location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamLocations {
    pub path: Vec<String>,
    pub query: Vec<String>,
    pub header: Vec<String>,
    pub cookie: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphqlOperationType {
    Query,
    Mutation,
    Subscription,
}

/// How an imported operation was exposed by its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum TransportHints {
    Rest {
        method: HttpMethod,
        path: String,
        params: ParamLocations,
    },
    Graphql {
        operation_type: GraphqlOperationType,
        field_name: String,
    },
}

impl TransportHints {
    /// Method and path, for REST hints
    pub fn rest_binding(&self) -> Option<(HttpMethod, &str)> {
        match self {
            Self::Rest { method, path, .. } => Some((*method, path.as_str())),
            Self::Graphql { .. } => None,
        }
    }
}

/// Result of an import: either a live spec or generated code only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "spec", rename_all = "camelCase")]
pub enum SpecPayload {
    Live(Box<OperationSpec>),
    CodeOnly,
}

impl SpecPayload {
    pub fn live(&self) -> Option<&OperationSpec> {
        match self {
            Self::Live(spec) => Some(spec),
            Self::CodeOnly => None,
        }
    }
}

/// One operation converted from an external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedOperationSpec {
    /// Canonical spec name
    pub name: String,
    pub code: String,
    pub file_name: String,
    pub spec: SpecPayload,
    pub transport_hints: TransportHints,
    pub source: SpecSource,
}

impl ImportedOperationSpec {
    pub fn as_generated_file(&self) -> GeneratedFile {
        GeneratedFile {
            file_name: self.file_name.clone(),
            code: self.code.clone(),
        }
    }
}

/// A file of generated code, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub file_name: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_spec_source_accessors() {
        let origin = SourceOrigin {
            kind: SourceKind::OpenApi,
            url: Some("https://api.example.com/openapi.json".into()),
            file: None,
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let source = SpecSource::new(&origin, "getWidget", at);
        assert_eq!(source.source_id(), "getWidget");
        assert_eq!(source.url(), Some("https://api.example.com/openapi.json"));
        assert_eq!(source.file(), None);
        assert_eq!(source.imported_at(), at);
        assert!(source.kind().is_importable());
    }

    #[test]
    fn test_transport_hints_serialization() {
        let hints = TransportHints::Rest {
            method: HttpMethod::Get,
            path: "/widgets/{id}".into(),
            params: ParamLocations {
                path: vec!["id".into()],
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&hints).unwrap();
        assert_eq!(value["transport"], "rest");
        assert_eq!(value["method"], "GET");
        assert_eq!(hints.rest_binding(), Some((HttpMethod::Get, "/widgets/{id}")));
    }

    #[test]
    fn test_future_source_kinds_are_not_importable() {
        for kind in [SourceKind::GraphQl, SourceKind::AsyncApi, SourceKind::Protobuf] {
            assert!(!kind.is_importable());
        }
    }
}
