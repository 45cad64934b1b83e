//! Types produced by parsing an OpenAPI document

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Status codes checked, in order, when picking the success response
pub const RESPONSE_PRIORITY: [&str; 4] = ["200", "201", "202", "204"];

/// OpenAPI major/minor line the document declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenApiVersion {
    #[default]
    #[serde(rename = "3.0")]
    V3_0,
    #[serde(rename = "3.1")]
    V3_1,
}

impl OpenApiVersion {
    /// Detect the version line from the `openapi` field
    pub fn detect(value: &str) -> Option<Self> {
        if value.starts_with("3.1") {
            Some(Self::V3_1)
        } else if value.starts_with("3.0") {
            Some(Self::V3_0)
        } else {
            None
        }
    }
}

/// HTTP methods an OpenAPI path item may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Lowercase form used as a path item key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Whether requests with this method are reads
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }

    /// Whether this method conventionally carries no request body
    pub fn uses_query_input(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Delete | Self::Options)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "put" => Ok(Self::Put),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            "options" => Ok(Self::Options),
            "head" => Ok(Self::Head),
            "patch" => Ok(Self::Patch),
            "trace" => Ok(Self::Trace),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Parameter location based on the OpenAPI "in" field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            _ => Err(format!("Unknown parameter location: {}", s)),
        }
    }
}

/// A parameter after `$ref` resolution and required-flag normalization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameter {
    pub name: String,
    pub location: ParameterLocation,
    /// Always true for path parameters
    pub required: bool,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Raw schema; nested `$ref`s are left for the importer to resolve
    pub schema: Option<JsonValue>,
}

/// Parameters grouped by location, each in declaration order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterBuckets {
    pub path: Vec<ParsedParameter>,
    pub query: Vec<ParsedParameter>,
    pub header: Vec<ParsedParameter>,
    pub cookie: Vec<ParsedParameter>,
}

impl ParameterBuckets {
    /// Sort a merged parameter list into buckets
    pub fn from_parameters(params: Vec<ParsedParameter>) -> Self {
        let mut buckets = Self::default();
        for param in params {
            match param.location {
                ParameterLocation::Path => buckets.path.push(param),
                ParameterLocation::Query => buckets.query.push(param),
                ParameterLocation::Header => buckets.header.push(param),
                ParameterLocation::Cookie => buckets.cookie.push(param),
            }
        }
        buckets
    }

    pub fn names(&self, location: ParameterLocation) -> Vec<String> {
        let bucket = match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        };
        bucket.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty() && self.header.is_empty() && self.cookie.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRequestBody {
    pub required: bool,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub schema: Option<JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    pub status: String,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub schema: Option<JsonValue>,
}

impl ParsedResponse {
    pub fn is_success(&self) -> bool {
        self.status.starts_with('2')
    }
}

/// One HTTP operation extracted from the document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOperation {
    /// Declared `operationId`, or one generated from method and path
    pub operation_id: String,
    /// Whether `operation_id` was generated rather than declared
    pub generated_id: bool,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: ParameterBuckets,
    pub request_body: Option<ParsedRequestBody>,
    /// Responses keyed by status code, in document order
    pub responses: IndexMap<String, ParsedResponse>,
    /// Names of the security schemes that apply to this operation
    pub security_schemes: Vec<String>,
}

impl ParsedOperation {
    /// Pick the response used for output inference.
    ///
    /// Checks 200, 201, 202 and 204 in that order, then falls back to the
    /// first 2xx response in document order that carries a schema.
    pub fn success_response(&self) -> Option<&ParsedResponse> {
        RESPONSE_PRIORITY
            .iter()
            .filter_map(|status| self.responses.get(*status))
            .find(|resp| resp.schema.is_some())
            .or_else(|| {
                self.responses
                    .values()
                    .find(|resp| resp.is_success() && resp.schema.is_some())
            })
    }

    /// Schema of the selected success response
    pub fn success_schema(&self) -> Option<&JsonValue> {
        self.success_response().and_then(|resp| resp.schema.as_ref())
    }

    /// Description, falling back to the summary
    pub fn description_or_summary(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.summary.as_deref())
    }
}

/// Entry of the document's `servers` list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Subset of the document's `info` block
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A recoverable problem found while parsing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub path: Option<String>,
    pub method: Option<HttpMethod>,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.method, &self.path) {
            (Some(method), Some(path)) => write!(f, "{} {}: {}", method, path, self.message),
            (None, Some(path)) => write!(f, "{}: {}", path, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Everything the parser extracts from one document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub version: OpenApiVersion,
    pub info: ApiInfo,
    pub operations: Vec<ParsedOperation>,
    /// `components.schemas`, raw, in document order
    pub schemas: IndexMap<String, JsonValue>,
    pub servers: Vec<ServerInfo>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    pub fn operation(&self, operation_id: &str) -> Option<&ParsedOperation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: &str, schema: Option<JsonValue>) -> ParsedResponse {
        ParsedResponse {
            status: status.to_string(),
            description: None,
            content_type: schema.as_ref().map(|_| "application/json".to_string()),
            schema,
        }
    }

    fn operation(responses: Vec<ParsedResponse>) -> ParsedOperation {
        ParsedOperation {
            operation_id: "op".into(),
            generated_id: false,
            method: HttpMethod::Post,
            path: "/op".into(),
            summary: None,
            description: None,
            tags: vec![],
            deprecated: false,
            parameters: ParameterBuckets::default(),
            request_body: None,
            responses: responses
                .into_iter()
                .map(|r| (r.status.clone(), r))
                .collect(),
            security_schemes: vec![],
        }
    }

    #[test]
    fn test_response_priority_prefers_200_over_201() {
        let op = operation(vec![
            response("201", Some(json!({"title": "created"}))),
            response("200", Some(json!({"title": "ok"}))),
        ]);
        assert_eq!(op.success_schema(), Some(&json!({"title": "ok"})));
    }

    #[test]
    fn test_response_priority_falls_back_to_first_2xx() {
        let op = operation(vec![
            response("204", None),
            response("206", Some(json!({"title": "partial"}))),
            response("299", Some(json!({"title": "later"}))),
        ]);
        assert_eq!(op.success_response().map(|r| r.status.as_str()), Some("206"));
    }

    #[test]
    fn test_no_success_schema() {
        let op = operation(vec![response("404", Some(json!({})))]);
        assert!(op.success_schema().is_none());
    }

    #[test]
    fn test_version_detection() {
        assert_eq!(OpenApiVersion::detect("3.1.0"), Some(OpenApiVersion::V3_1));
        assert_eq!(OpenApiVersion::detect("3.0.3"), Some(OpenApiVersion::V3_0));
        assert_eq!(OpenApiVersion::detect("2.0"), None);
    }

    #[test]
    fn test_method_round_trip() {
        for name in ["get", "PUT", "Post", "delete", "patch"] {
            let method: HttpMethod = name.parse().unwrap();
            assert_eq!(method.as_str(), name.to_lowercase());
        }
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert!("fetch".parse::<HttpMethod>().is_err());
    }
}
