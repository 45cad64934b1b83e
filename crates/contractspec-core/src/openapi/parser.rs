//! Turns an [`OpenApiDocument`] into a flat list of [`ParsedOperation`]s.
//!
//! Parsing is fail-soft: a malformed path item, operation or parameter is
//! recorded as a [`ParseWarning`] and skipped, so one broken entry never
//! blocks the rest of the document.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use super::document::{ref_name, ref_of, OpenApiDocument};
use super::types::{
    ApiInfo, HttpMethod, OpenApiVersion, ParameterBuckets, ParameterLocation, ParseResult,
    ParseWarning, ParsedOperation, ParsedParameter, ParsedRequestBody, ParsedResponse, ServerInfo,
};
use crate::utils::operation_id_from_path;

/// Parse every operation of `document`
pub fn parse(document: &OpenApiDocument) -> ParseResult {
    let mut parser = Parser::new(document);
    parser.run()
}

impl OpenApiDocument {
    /// Parse every operation of this document
    pub fn parse(&self) -> ParseResult {
        parse(self)
    }
}

struct Parser<'a> {
    doc: &'a OpenApiDocument,
    warnings: Vec<ParseWarning>,
    seen_ids: HashMap<String, usize>,
}

impl<'a> Parser<'a> {
    fn new(doc: &'a OpenApiDocument) -> Self {
        Self {
            doc,
            warnings: Vec::new(),
            seen_ids: HashMap::new(),
        }
    }

    fn run(&mut self) -> ParseResult {
        let doc = self.doc;
        let version = self.detect_version();
        let info = self.info();
        let servers = self.servers();
        let schemas = doc
            .json
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let mut operations = Vec::new();
        match doc.paths() {
            Some(paths) => {
                for (path, item) in paths {
                    operations.extend(self.parse_path_item(path, item));
                }
            }
            None => self.warn(None, None, "document has no 'paths' object"),
        }

        log::debug!(
            "parsed {} operations with {} warnings",
            operations.len(),
            self.warnings.len()
        );

        ParseResult {
            version,
            info,
            operations,
            schemas,
            servers,
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn detect_version(&mut self) -> OpenApiVersion {
        let doc = self.doc;
        match doc.openapi_version() {
            Some(raw) => OpenApiVersion::detect(raw).unwrap_or_else(|| {
                self.warn(
                    None,
                    None,
                    format!("unsupported openapi version '{}', reading as 3.0", raw),
                );
                OpenApiVersion::V3_0
            }),
            None => {
                let message = if doc.json.get("swagger").is_some() {
                    "Swagger 2.0 documents are not supported, reading as 3.0"
                } else {
                    "missing 'openapi' version field, reading as 3.0"
                };
                self.warn(None, None, message);
                OpenApiVersion::V3_0
            }
        }
    }

    fn info(&self) -> ApiInfo {
        let info = self.doc.json.get("info");
        let field = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(JsonValue::as_str)
                .map(String::from)
        };
        ApiInfo {
            title: field("title").unwrap_or_default(),
            version: field("version").unwrap_or_default(),
            description: field("description"),
        }
    }

    fn servers(&self) -> Vec<ServerInfo> {
        self.doc
            .json
            .get("servers")
            .and_then(JsonValue::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(|s| {
                        Some(ServerInfo {
                            url: s.get("url")?.as_str()?.to_string(),
                            description: s
                                .get("description")
                                .and_then(JsonValue::as_str)
                                .map(String::from),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_path_item(&mut self, path: &str, item: &JsonValue) -> Vec<ParsedOperation> {
        let doc = self.doc;
        let item = match doc.resolve(item) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.warn(Some(path), None, e.to_string());
                return Vec::new();
            }
        };
        let Some(item) = item.as_object() else {
            self.warn(Some(path), None, "path item is not an object, skipped");
            return Vec::new();
        };

        let shared = self.parse_parameters(path, None, item.get("parameters"));
        let mut operations = Vec::new();
        for (key, value) in item {
            let Ok(method) = key.parse::<HttpMethod>() else {
                continue;
            };
            match value.as_object() {
                Some(op) => operations.push(self.parse_operation(path, method, op, &shared)),
                None => self.warn(
                    Some(path),
                    Some(method),
                    "operation is not an object, skipped",
                ),
            }
        }
        operations
    }

    fn parse_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        op: &Map<String, JsonValue>,
        shared: &[ParsedParameter],
    ) -> ParsedOperation {
        let declared_id = op
            .get("operationId")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(String::from);
        let generated_id = declared_id.is_none();
        let operation_id = self.unique_id(
            path,
            method,
            declared_id.unwrap_or_else(|| operation_id_from_path(method.as_str(), path)),
        );

        // Operation-level parameters override path-level ones by name
        let mut parameters: Vec<ParsedParameter> = shared.to_vec();
        for param in self.parse_parameters(path, Some(method), op.get("parameters")) {
            match parameters.iter_mut().find(|p| p.name == param.name) {
                Some(existing) => *existing = param,
                None => parameters.push(param),
            }
        }

        ParsedOperation {
            operation_id,
            generated_id,
            method,
            path: path.to_string(),
            summary: str_field(op, "summary"),
            description: str_field(op, "description"),
            tags: op
                .get("tags")
                .and_then(JsonValue::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(JsonValue::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            deprecated: op
                .get("deprecated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            parameters: ParameterBuckets::from_parameters(parameters),
            request_body: self.parse_request_body(path, method, op.get("requestBody")),
            responses: self.parse_responses(path, method, op.get("responses")),
            security_schemes: self.security_schemes(op),
        }
    }

    fn unique_id(&mut self, path: &str, method: HttpMethod, id: String) -> String {
        let count = self.seen_ids.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            return id;
        }
        let unique = format!("{}_{}", id, count);
        self.warn(
            Some(path),
            Some(method),
            format!("duplicate operationId '{}', renamed to '{}'", id, unique),
        );
        unique
    }

    fn parse_parameters(
        &mut self,
        path: &str,
        method: Option<HttpMethod>,
        raw: Option<&JsonValue>,
    ) -> Vec<ParsedParameter> {
        let doc = self.doc;
        let Some(raw) = raw else {
            return Vec::new();
        };
        let Some(items) = raw.as_array() else {
            self.warn(Some(path), method, "'parameters' is not an array, ignored");
            return Vec::new();
        };

        let mut params = Vec::new();
        for item in items {
            let resolved = match doc.resolve(item) {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.warn(Some(path), method, e.to_string());
                    continue;
                }
            };
            if let Some(reference) = ref_of(resolved) {
                let param = unresolved_parameter(reference, resolved);
                self.warn(
                    Some(path),
                    method,
                    format!(
                        "unresolved parameter reference '{}' kept as query parameter '{}'",
                        reference, param.name
                    ),
                );
                params.push(param);
                continue;
            }
            match parse_parameter(resolved) {
                Ok(param) => params.push(param),
                Err(message) => self.warn(Some(path), method, message),
            }
        }
        params
    }

    fn parse_request_body(
        &mut self,
        path: &str,
        method: HttpMethod,
        raw: Option<&JsonValue>,
    ) -> Option<ParsedRequestBody> {
        let doc = self.doc;
        let body = match doc.resolve(raw?) {
            Ok(body) if ref_of(body).is_some() => {
                return Some(ParsedRequestBody {
                    required: false,
                    description: None,
                    content_type: None,
                    schema: Some(body.clone()),
                });
            }
            Ok(body) => body.as_object()?,
            Err(e) => {
                self.warn(Some(path), Some(method), e.to_string());
                return None;
            }
        };
        let (content_type, schema) = select_media(body.get("content"));
        Some(ParsedRequestBody {
            required: body
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            description: str_field(body, "description"),
            content_type,
            schema,
        })
    }

    fn parse_responses(
        &mut self,
        path: &str,
        method: HttpMethod,
        raw: Option<&JsonValue>,
    ) -> IndexMap<String, ParsedResponse> {
        let doc = self.doc;
        let mut responses = IndexMap::new();
        let Some(map) = raw.and_then(JsonValue::as_object) else {
            return responses;
        };
        for (status, value) in map {
            let resolved = match doc.resolve(value) {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.warn(Some(path), Some(method), e.to_string());
                    continue;
                }
            };
            if ref_of(resolved).is_some() {
                responses.insert(
                    status.clone(),
                    ParsedResponse {
                        status: status.clone(),
                        description: None,
                        content_type: None,
                        schema: Some(resolved.clone()),
                    },
                );
                continue;
            }
            let Some(resp) = resolved.as_object() else {
                self.warn(
                    Some(path),
                    Some(method),
                    format!("response '{}' is not an object, skipped", status),
                );
                continue;
            };
            let (content_type, schema) = select_media(resp.get("content"));
            responses.insert(
                status.clone(),
                ParsedResponse {
                    status: status.clone(),
                    description: str_field(resp, "description"),
                    content_type,
                    schema,
                },
            );
        }
        responses
    }

    fn security_schemes(&self, op: &Map<String, JsonValue>) -> Vec<String> {
        let requirements = op
            .get("security")
            .or_else(|| self.doc.json.get("security"))
            .and_then(JsonValue::as_array);
        let mut names: Vec<String> = Vec::new();
        for requirement in requirements.into_iter().flatten() {
            for name in requirement.as_object().into_iter().flat_map(|m| m.keys()) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    fn warn(&mut self, path: Option<&str>, method: Option<HttpMethod>, message: impl Into<String>) {
        let warning = ParseWarning {
            path: path.map(String::from),
            method,
            message: message.into(),
        };
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn parse_parameter(value: &JsonValue) -> Result<ParsedParameter, String> {
    let map = value
        .as_object()
        .ok_or_else(|| "parameter is not an object, skipped".to_string())?;
    let name = str_field(map, "name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "parameter without a name, skipped".to_string())?;
    let location = map
        .get("in")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| format!("parameter '{}' has no location, skipped", name))?
        .parse::<ParameterLocation>()
        .map_err(|e| format!("parameter '{}': {}, skipped", name, e))?;
    let declared_required = map
        .get("required")
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);
    let schema = map
        .get("schema")
        .cloned()
        .or_else(|| select_media(map.get("content")).1);

    Ok(ParsedParameter {
        required: location == ParameterLocation::Path || declared_required,
        location,
        description: str_field(map, "description"),
        deprecated: map
            .get("deprecated")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        schema,
        name,
    })
}

/// Stand-in for a parameter whose `$ref` points outside the document.
///
/// Name and location are unknown, so the name comes from the last pointer
/// segment and the parameter is treated as an optional query parameter whose
/// schema is the reference itself.
fn unresolved_parameter(reference: &str, node: &JsonValue) -> ParsedParameter {
    let name = ref_name(reference);
    ParsedParameter {
        name: if name.is_empty() { reference.to_string() } else { name.to_string() },
        location: ParameterLocation::Query,
        required: false,
        description: None,
        deprecated: false,
        schema: Some(node.clone()),
    }
}

/// Pick a media type from a `content` map: JSON first, then any `+json`,
/// then whatever is declared first.
fn select_media(content: Option<&JsonValue>) -> (Option<String>, Option<JsonValue>) {
    let Some(content) = content.and_then(JsonValue::as_object) else {
        return (None, None);
    };
    let chosen = content
        .get_key_value("application/json")
        .or_else(|| content.iter().find(|(k, _)| k.ends_with("+json")))
        .or_else(|| content.iter().next());
    match chosen {
        Some((media_type, media)) => (Some(media_type.clone()), media.get("schema").cloned()),
        None => (None, None),
    }
}

fn str_field(map: &Map<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key).and_then(JsonValue::as_str).map(String::from)
}
