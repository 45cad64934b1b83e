//! Import parsed OpenAPI operations as ContractSpec operation specs.
//!
//! The importer does no I/O. Each operation is filtered, converted and
//! rendered on its own: a failure is recorded against its operation id and
//! the batch carries on.
//!
//! # Examples
//!
//! ```
//! use contractspec_core::import::{import_from_openapi, ImportOptions};
//! use contractspec_core::openapi::OpenApiDocument;
//!
//! let doc = OpenApiDocument::parse_content(r#"{
//!   "openapi": "3.1.0",
//!   "info": {"title": "Widgets", "version": "1.0.0"},
//!   "paths": {"/widgets/{id}": {"get": {
//!     "operationId": "getWidget",
//!     "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
//!     "responses": {"200": {"description": "ok"}}
//!   }}}
//! }"#, None)?;
//! let result = import_from_openapi(&doc.parse(), &ImportOptions::default());
//! assert_eq!(result.summary.imported, 1);
//! assert_eq!(result.specs[0].file_name, "get-widget.ts");
//! # Ok::<(), contractspec_core::Error>(())
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::contract::{
    AuthLevel, ImportedOperationSpec, OpKind, OperationIo, OperationSpec, ParamLocations,
    PolicySpec, RestOverride, SourceOrigin, SpecMeta, SpecPayload, SpecSource, Stability,
    TransportHints, TransportOverride,
};
use crate::openapi::{OpenApiDocument, ParameterLocation, ParseResult, ParsedOperation, ParsedParameter};
use crate::schema::convert::{inspect, to_schema_model, Shape};
use crate::schema::{create_generator, GeneratorFormat, OperationContext, SchemaGenerator};
use crate::utils::{sanitize_filename, to_kebab_case, to_lower_camel_case};
use crate::Result;

/// Headers that describe the transport rather than the operation's input
pub const RESERVED_HEADERS: [&str; 4] = ["authorization", "content-type", "accept", "user-agent"];

/// Property used for request bodies that are not objects
pub const BODY_PROPERTY: &str = "body";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    pub format: GeneratorFormat,
    /// Prepended to spec names as `prefix.name`
    pub prefix: Option<String>,
    /// Tag allow-list; empty admits every operation
    pub tags: Vec<String>,
    /// Operation ids to import; when non-empty `exclude` is ignored
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_deprecated: bool,
    pub default_stability: Stability,
    pub default_version: u32,
    /// Build the canonical spec alongside the generated code
    pub emit_live_spec: bool,
    pub source: SourceOrigin,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: GeneratorFormat::default(),
            prefix: None,
            tags: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            include_deprecated: false,
            default_stability: Stability::default(),
            default_version: 1,
            emit_live_spec: true,
            source: SourceOrigin::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    NotInTags,
    NotIncluded,
    Excluded,
    Deprecated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotInTags => "no tag in the allow-list",
            Self::NotIncluded => "not in the include list",
            Self::Excluded => "in the exclude list",
            Self::Deprecated => "deprecated",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOperation {
    pub operation_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub operation_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub specs: Vec<ImportedOperationSpec>,
    pub skipped: Vec<SkippedOperation>,
    pub errors: Vec<ImportFailure>,
    pub summary: ImportSummary,
}

/// Import every operation of a parse result
pub fn import_from_openapi(parse: &ParseResult, options: &ImportOptions) -> ImportResult {
    let resolver = OpenApiDocument::from_components(&parse.schemas);
    let generator = create_generator(options.format);
    let imported_at = Utc::now();
    let mut result = ImportResult::default();
    let mut names = HashSet::new();
    let mut file_names = HashSet::new();

    for op in &parse.operations {
        if let Some(reason) = skip_reason(op, options) {
            log::warn!("skipping {} ({} {}): {}", op.operation_id, op.method, op.path, reason);
            result.skipped.push(SkippedOperation {
                operation_id: op.operation_id.clone(),
                reason,
            });
            continue;
        }

        let wanted = spec_name(&op.operation_id, options.prefix.as_deref());
        let name = claim_unique(&mut names, wanted.clone(), |base, n| format!("{}_{}", base, n));
        if name != wanted {
            log::warn!("{}: spec name '{}' already taken, renamed to '{}'", op.operation_id, wanted, name);
        }

        match import_operation(op, name, &resolver, generator.as_ref(), options, imported_at) {
            Ok(mut spec) => {
                spec.file_name = claim_unique(&mut file_names, spec.file_name, |file, n| {
                    match file.rsplit_once('.') {
                        Some((stem, ext)) => format!("{}-{}.{}", stem, n, ext),
                        None => format!("{}-{}", file, n),
                    }
                });
                log::debug!("imported {} as {}", op.operation_id, spec.name);
                result.specs.push(spec);
            }
            Err(e) => {
                log::warn!("failed to import {}: {}", op.operation_id, e);
                result.errors.push(ImportFailure {
                    operation_id: op.operation_id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    result.summary = ImportSummary {
        total: parse.operations.len(),
        imported: result.specs.len(),
        skipped: result.skipped.len(),
        errors: result.errors.len(),
    };
    log::info!(
        "import finished: {} imported, {} skipped, {} failed of {} operations",
        result.summary.imported,
        result.summary.skipped,
        result.summary.errors,
        result.summary.total
    );
    result
}

/// First filter rule that rejects `op`, if any
pub fn skip_reason(op: &ParsedOperation, options: &ImportOptions) -> Option<SkipReason> {
    if !options.tags.is_empty() && !op.tags.iter().any(|tag| options.tags.contains(tag)) {
        return Some(SkipReason::NotInTags);
    }
    if !options.include.is_empty() {
        if !options.include.contains(&op.operation_id) {
            return Some(SkipReason::NotIncluded);
        }
    } else if options.exclude.contains(&op.operation_id) {
        return Some(SkipReason::Excluded);
    }
    if op.deprecated && !options.include_deprecated {
        return Some(SkipReason::Deprecated);
    }
    None
}

/// Canonical spec name for an operation id
pub fn spec_name(operation_id: &str, prefix: Option<&str>) -> String {
    let base = to_lower_camel_case(operation_id);
    let base = if base.is_empty() { operation_id.to_string() } else { base };
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}.{}", prefix, base),
        None => base,
    }
}

/// Take `candidate`, or the first free `suffixed(candidate, n)` for n >= 2
fn claim_unique(
    taken: &mut HashSet<String>,
    candidate: String,
    suffixed: impl Fn(&str, usize) -> String,
) -> String {
    let mut claimed = candidate.clone();
    let mut n = 1;
    while taken.contains(&claimed) {
        n += 1;
        claimed = suffixed(&candidate, n);
    }
    taken.insert(claimed.clone());
    claimed
}

fn import_operation(
    op: &ParsedOperation,
    name: String,
    resolver: &OpenApiDocument,
    generator: &dyn SchemaGenerator,
    options: &ImportOptions,
    imported_at: DateTime<Utc>,
) -> Result<ImportedOperationSpec> {
    let input_schema = build_input_schema(op, resolver)?;
    let output_schema = op
        .success_schema()
        .map(|schema| resolver.dereference(schema))
        .transpose()?;

    let spec = OperationSpec {
        meta: SpecMeta {
            name: name.clone(),
            version: options.default_version,
            kind: OpKind::from_method(op.method),
            stability: if op.deprecated {
                Stability::Deprecated
            } else {
                options.default_stability
            },
            description: op.description_or_summary().map(String::from),
            goal: op.summary.clone(),
            tags: op.tags.clone(),
            owners: Vec::new(),
        },
        io: OperationIo::default(),
        policy: PolicySpec {
            auth: if op.security_schemes.is_empty() {
                AuthLevel::Anonymous
            } else {
                AuthLevel::User
            },
        },
        transport: TransportOverride {
            rest: Some(RestOverride {
                method: Some(op.method),
                path: Some(op.path.clone()),
            }),
        },
    };

    let mut ctx = OperationContext {
        spec,
        method: op.method,
        path: op.path.clone(),
        input_schema,
        output_schema,
    };
    ctx.spec.io = OperationIo {
        input: ctx
            .input_schema
            .as_ref()
            .map(|schema| to_schema_model(schema, &ctx.input_model_name())),
        output: ctx
            .output_schema
            .as_ref()
            .map(|schema| to_schema_model(schema, &ctx.output_model_name())),
    };

    let code = generator.render_operation(&ctx)?;
    let file_name = sanitize_filename(&format!(
        "{}.{}",
        to_kebab_case(&name),
        generator.file_extension()
    ));

    Ok(ImportedOperationSpec {
        name,
        code,
        file_name,
        spec: if options.emit_live_spec {
            SpecPayload::Live(Box::new(ctx.spec))
        } else {
            SpecPayload::CodeOnly
        },
        transport_hints: TransportHints::Rest {
            method: op.method,
            path: op.path.clone(),
            params: ParamLocations {
                path: op.parameters.names(ParameterLocation::Path),
                query: op.parameters.names(ParameterLocation::Query),
                header: op.parameters.names(ParameterLocation::Header),
                cookie: op.parameters.names(ParameterLocation::Cookie),
            },
        },
        source: SpecSource::new(&options.source, op.operation_id.clone(), imported_at),
    })
}

/// Merge parameters and the request body into one object schema.
///
/// Sources are taken in order path, query, header (minus reserved headers),
/// body; the first source to declare a property keeps its schema, and a
/// property is required when any source requires it.
pub fn build_input_schema(op: &ParsedOperation, resolver: &OpenApiDocument) -> Result<Option<JsonValue>> {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();
    let mut add = |name: &str, schema: JsonValue, is_required: bool| {
        if properties.contains_key(name) {
            log::debug!("{}: input property '{}' already declared", op.operation_id, name);
        } else {
            properties.insert(name.to_string(), schema);
        }
        if is_required && !required.iter().any(|r| r == name) {
            required.push(name.to_string());
        }
    };

    let headers = op.parameters.header.iter().filter(|p| {
        !RESERVED_HEADERS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&p.name))
    });
    for param in op
        .parameters
        .path
        .iter()
        .chain(op.parameters.query.iter())
        .chain(headers)
    {
        let is_required = param.required || param.location == ParameterLocation::Path;
        add(&param.name, parameter_schema(param, resolver)?, is_required);
    }

    if let Some(schema) = op.request_body.as_ref().and_then(|body| body.schema.as_ref()) {
        let schema = resolver.dereference(schema)?;
        match inspect(&schema).shape {
            Shape::Object {
                properties: body_properties,
                required: body_required,
            } => {
                for (name, prop) in body_properties {
                    let is_required = body_required.contains(&name);
                    add(&name, prop, is_required);
                }
            }
            _ => {
                let body_required = op.request_body.as_ref().map_or(false, |b| b.required);
                add(BODY_PROPERTY, schema, body_required);
            }
        }
    }

    if properties.is_empty() {
        return Ok(None);
    }
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), JsonValue::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Ok(Some(JsonValue::Object(schema)))
}

fn parameter_schema(param: &ParsedParameter, resolver: &OpenApiDocument) -> Result<JsonValue> {
    let mut schema = match &param.schema {
        Some(schema) => resolver.dereference(schema)?,
        None => json!({"type": "string"}),
    };
    if let (Some(description), Some(map)) = (&param.description, schema.as_object_mut()) {
        map.entry("description")
            .or_insert_with(|| json!(description));
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::HttpMethod;
    use crate::schema::FieldType;
    use pretty_assertions::assert_eq;

    fn parse(json: JsonValue) -> ParseResult {
        OpenApiDocument::new(json).parse()
    }

    fn widgets_api() -> ParseResult {
        parse(json!({
            "openapi": "3.0.3",
            "info": {"title": "Widgets", "version": "1.0.0"},
            "paths": {
                "/widgets/{id}": {
                    "get": {
                        "operationId": "getWidget",
                        "tags": ["widgets"],
                        "summary": "Fetch a widget",
                        "parameters": [
                            {"name": "id", "in": "path", "schema": {"type": "string"}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                            {"name": "Authorization", "in": "header", "schema": {"type": "string"}},
                            {"name": "X-Tenant", "in": "header", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Widget"}}}
                            }
                        }
                    },
                    "put": {
                        "operationId": "updateWidget",
                        "tags": ["widgets"],
                        "security": [{"bearer": []}],
                        "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}},
                                "required": ["name"]
                            }}}
                        },
                        "responses": {"204": {"description": "done"}}
                    }
                },
                "/legacy": {
                    "post": {
                        "operationId": "legacyUpload",
                        "tags": ["admin"],
                        "deprecated": true,
                        "requestBody": {
                            "required": true,
                            "content": {"application/octet-stream": {"schema": {"type": "string", "format": "binary"}}}
                        },
                        "responses": {"201": {"description": "created"}}
                    }
                }
            },
            "components": {"schemas": {
                "Widget": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}, "name": {"type": "string"}},
                    "required": ["id", "name"]
                }
            }}
        }))
    }

    fn live(result: &ImportResult, name: &str) -> OperationSpec {
        result
            .specs
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.spec.live())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_clean_import_of_path_operation() {
        let result = import_from_openapi(&widgets_api(), &ImportOptions::default());
        assert_eq!(result.summary.imported, 2);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.errors.is_empty());

        let imported = &result.specs[0];
        assert_eq!(imported.file_name, "get-widget.ts");
        match &imported.transport_hints {
            TransportHints::Rest { method, path, params } => {
                assert_eq!(*method, HttpMethod::Get);
                assert_eq!(path, "/widgets/{id}");
                assert_eq!(params.path, vec!["id".to_string()]);
                assert_eq!(params.query, vec!["limit".to_string()]);
            }
            other => panic!("unexpected hints {:?}", other),
        }
        assert_eq!(imported.source.source_id(), "getWidget");
    }

    #[test]
    fn test_required_set_and_reserved_headers() {
        let result = import_from_openapi(&widgets_api(), &ImportOptions::default());
        let spec = live(&result, "getWidget");
        let input = spec.io.input.unwrap();
        assert!(!input.fields["id"].is_optional);
        assert!(input.fields["limit"].is_optional);
        assert!(!input.fields["X-Tenant"].is_optional);
        assert!(!input.fields.contains_key("Authorization"));

        let output = spec.io.output.unwrap();
        assert_eq!(output.name, "GetWidgetOutput");
        assert_eq!(output.required_fields(), vec!["id", "name"]);
    }

    #[test]
    fn test_kind_policy_and_metadata() {
        let result = import_from_openapi(&widgets_api(), &ImportOptions::default());
        let get = live(&result, "getWidget");
        assert_eq!(get.meta.kind, OpKind::Query);
        assert_eq!(get.policy.auth, AuthLevel::Anonymous);
        assert_eq!(get.meta.description.as_deref(), Some("Fetch a widget"));
        assert_eq!(get.http_method(), HttpMethod::Get);
        assert_eq!(get.http_path(), "/widgets/{id}");

        let put = live(&result, "updateWidget");
        assert_eq!(put.meta.kind, OpKind::Command);
        assert_eq!(put.policy.auth, AuthLevel::User);
        assert!(put.io.output.is_none());
    }

    #[test]
    fn test_path_param_wins_over_body_property() {
        let result = import_from_openapi(&widgets_api(), &ImportOptions::default());
        let input = live(&result, "updateWidget").io.input.unwrap();
        let names: Vec<&str> = input.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(
            input.fields["id"].field_type,
            FieldType::Scalar(crate::schema::ScalarType::String)
        );
        assert!(!input.fields["name"].is_optional);
    }

    #[test]
    fn test_required_flags_are_unioned_across_sources() {
        let parse = parse(json!({
            "openapi": "3.0.3",
            "paths": {"/widgets": {"post": {
                "operationId": "renameWidget",
                "parameters": [{"name": "name", "in": "query", "schema": {"type": "string"}}],
                "requestBody": {"content": {"application/json": {"schema": {
                    "type": "object",
                    "properties": {"name": {"type": "integer"}},
                    "required": ["name"]
                }}}},
                "responses": {"204": {"description": "done"}}
            }}}
        }));
        let result = import_from_openapi(&parse, &ImportOptions::default());
        let input = live(&result, "renameWidget").io.input.unwrap();
        assert_eq!(input.required_fields(), vec!["name"]);
        assert_eq!(
            input.fields["name"].field_type,
            FieldType::Scalar(crate::schema::ScalarType::String)
        );
    }

    #[test]
    fn test_external_refs_become_unknown_fields() {
        let parse = parse(json!({
            "openapi": "3.0.3",
            "paths": {"/widgets": {"post": {
                "operationId": "createWidget",
                "requestBody": {"$ref": "common.yaml#/Body"},
                "responses": {"200": {"$ref": "common.yaml#/Ok"}}
            }}}
        }));
        let result = import_from_openapi(&parse, &ImportOptions::default());
        assert!(result.errors.is_empty());
        let spec = live(&result, "createWidget");

        let input = spec.io.input.unwrap();
        assert_eq!(
            input.fields[BODY_PROPERTY].field_type,
            FieldType::Unknown { reference: Some("common.yaml#/Body".into()) }
        );
        let output = spec.io.output.unwrap();
        assert_eq!(
            output.fields["value"].field_type,
            FieldType::Unknown { reference: Some("common.yaml#/Ok".into()) }
        );
        assert!(result.specs[0]
            .code
            .contains("unresolved reference common.yaml#/Ok, needs manual review"));
    }

    #[test]
    fn test_colliding_names_are_made_unique() {
        let parse = parse(json!({
            "openapi": "3.0.3",
            "paths": {
                "/a": {"get": {"operationId": "get_widget", "responses": {}}},
                "/b": {"get": {"operationId": "getWidget", "responses": {}}}
            }
        }));
        let result = import_from_openapi(&parse, &ImportOptions::default());
        let names: Vec<(&str, &str)> = result
            .specs
            .iter()
            .map(|s| (s.name.as_str(), s.file_name.as_str()))
            .collect();
        assert_eq!(names[0], ("getWidget", "get-widget.ts"));
        assert_eq!(names[1].0, "getWidget_2");
        assert_ne!(names[1].1, names[0].1);

        let mut registry = crate::contract::OperationRegistry::new();
        for spec in result.specs.iter().filter_map(|s| s.spec.live()) {
            registry.register(spec.clone()).unwrap();
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_non_object_body_goes_under_body_property() {
        let options = ImportOptions {
            include_deprecated: true,
            ..Default::default()
        };
        let result = import_from_openapi(&widgets_api(), &options);
        let legacy = live(&result, "legacyUpload");
        assert_eq!(legacy.meta.stability, Stability::Deprecated);
        let input = legacy.io.input.unwrap();
        assert!(!input.fields[BODY_PROPERTY].is_optional);
    }

    #[test]
    fn test_filter_order() {
        let parse = widgets_api();
        let op = |id: &str| parse.operation(id).unwrap();

        let tags = ImportOptions {
            tags: vec!["admin".into()],
            include_deprecated: true,
            ..Default::default()
        };
        assert_eq!(skip_reason(op("getWidget"), &tags), Some(SkipReason::NotInTags));
        assert_eq!(skip_reason(op("legacyUpload"), &tags), None);

        let include_wins = ImportOptions {
            include: vec!["getWidget".into()],
            exclude: vec!["getWidget".into()],
            ..Default::default()
        };
        assert_eq!(skip_reason(op("getWidget"), &include_wins), None);
        assert_eq!(skip_reason(op("updateWidget"), &include_wins), Some(SkipReason::NotIncluded));

        let exclude = ImportOptions {
            exclude: vec!["updateWidget".into()],
            ..Default::default()
        };
        assert_eq!(skip_reason(op("updateWidget"), &exclude), Some(SkipReason::Excluded));
        assert_eq!(skip_reason(op("legacyUpload"), &exclude), Some(SkipReason::Deprecated));
    }

    #[test]
    fn test_cyclic_schema_is_recorded_and_batch_continues() {
        let parse = parse(json!({
            "openapi": "3.1.0",
            "info": {"title": "Trees", "version": "1"},
            "paths": {
                "/nodes": {
                    "get": {
                        "operationId": "listNodes",
                        "responses": {"200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Node"}}}
                        }}
                    },
                    "delete": {"operationId": "clearNodes", "responses": {"204": {"description": "gone"}}}
                }
            },
            "components": {"schemas": {"Node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}}
            }}}
        }));
        let result = import_from_openapi(&parse, &ImportOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].operation_id, "listNodes");
        assert!(result.errors[0].message.contains("Cyclic"));
        assert_eq!(result.specs.len(), 1);
        assert_eq!(result.summary.total, 2);
    }

    #[test]
    fn test_prefix_and_code_only_mode() {
        let options = ImportOptions {
            prefix: Some("catalog".into()),
            emit_live_spec: false,
            format: GeneratorFormat::Graphql,
            ..Default::default()
        };
        let result = import_from_openapi(&widgets_api(), &options);
        let imported = &result.specs[0];
        assert_eq!(imported.name, "catalog.getWidget");
        assert_eq!(imported.file_name, "catalog-get-widget.graphql");
        assert_eq!(imported.spec, SpecPayload::CodeOnly);
        assert!(imported.code.contains("extend type Query"));
    }

    #[test]
    fn test_spec_name() {
        assert_eq!(spec_name("get_widget", None), "getWidget");
        assert_eq!(spec_name("getWidget", Some("shop")), "shop.getWidget");
        assert_eq!(spec_name("getWidget", Some("")), "getWidget");
    }
}
