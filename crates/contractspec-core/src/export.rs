//! Export ContractSpec registries as an OpenAPI 3.1 document.
//!
//! Operations become path items; the other registries ride along as
//! `x-contractspec-*` root extensions. Registry wiring code can be generated
//! next to the document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::contract::{AuthLevel, ContractRegistries, GeneratedFile, OperationSpec};
use crate::openapi::{HttpMethod, ServerInfo};
use crate::schema::convert::{field_json_schema, to_json_schema};
use crate::templates::ts_string;
use crate::utils::{path_template_params, to_kebab_case, to_lower_camel_case};
use crate::Result;

/// Version written to the `openapi` field
pub const OPENAPI_VERSION: &str = "3.1.0";

const CONTRACTS_PACKAGE: &str = "@contractspec/lib.contracts";
const BEARER_SCHEME: &str = "bearerAuth";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub servers: Vec<ServerInfo>,
    /// Also generate registry wiring code
    pub generate_registries: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "ContractSpec API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            servers: Vec::new(),
            generate_registries: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub open_api: JsonValue,
    pub registries: Option<Vec<GeneratedFile>>,
}

impl ExportResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.open_api)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.open_api)?)
    }
}

/// Build the OpenAPI document, and optionally registry code, for `registries`
pub fn export_contract_spec(registries: &ContractRegistries, options: &ExportOptions) -> ExportResult {
    let mut paths = Map::new();
    let mut schemas = Map::new();
    let mut uses_auth = false;

    for spec in registries.operations.iter() {
        let operation_id = spec.export_operation_id();
        let method = spec.http_method();
        let path = spec.http_path();
        uses_auth |= spec.policy.auth != AuthLevel::Anonymous;

        let operation = export_operation(spec, &operation_id, method, &path, &mut schemas);
        let item = paths
            .entry(path.clone())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if let Some(item) = item.as_object_mut() {
            if item.contains_key(method.as_str()) {
                log::warn!(
                    "{} {} is bound by more than one spec, keeping {}",
                    method,
                    path,
                    operation_id
                );
            }
            item.insert(method.as_str().to_string(), operation);
        }
    }

    let mut info = Map::new();
    info.insert("title".into(), json!(options.title));
    info.insert("version".into(), json!(options.version));
    if let Some(description) = &options.description {
        info.insert("description".into(), json!(description));
    }

    let mut components = Map::new();
    components.insert("schemas".into(), JsonValue::Object(schemas));
    if uses_auth {
        components.insert(
            "securitySchemes".into(),
            json!({ BEARER_SCHEME: {"type": "http", "scheme": "bearer"} }),
        );
    }

    let mut doc = Map::new();
    doc.insert("openapi".into(), json!(OPENAPI_VERSION));
    doc.insert("info".into(), JsonValue::Object(info));
    if !options.servers.is_empty() {
        doc.insert("servers".into(), json!(options.servers));
    }
    doc.insert("paths".into(), JsonValue::Object(paths));
    doc.insert("components".into(), JsonValue::Object(components));

    for (key, value) in [
        ("x-contractspec-events", extension(&registries.events)),
        ("x-contractspec-features", extension(&registries.features)),
        ("x-contractspec-presentations", extension(&registries.presentations)),
        ("x-contractspec-forms", extension(&registries.forms)),
        ("x-contractspec-dataviews", extension(&registries.data_views)),
        ("x-contractspec-workflows", extension(&registries.workflows)),
    ] {
        if let Some(value) = value {
            doc.insert(key.to_string(), value);
        }
    }

    log::info!(
        "exported {} operations across {} paths",
        registries.operations.len(),
        doc["paths"].as_object().map_or(0, |p| p.len())
    );

    ExportResult {
        open_api: JsonValue::Object(doc),
        registries: options
            .generate_registries
            .then(|| registry_files(registries)),
    }
}

fn extension<T: Serialize>(entries: &[T]) -> Option<JsonValue> {
    if entries.is_empty() {
        return None;
    }
    serde_json::to_value(entries).ok()
}

fn export_operation(
    spec: &OperationSpec,
    operation_id: &str,
    method: HttpMethod,
    path: &str,
    schemas: &mut Map<String, JsonValue>,
) -> JsonValue {
    let meta = &spec.meta;
    let mut operation = Map::new();
    operation.insert("operationId".into(), json!(operation_id));
    if let Some(goal) = &meta.goal {
        operation.insert("summary".into(), json!(goal));
    }
    if let Some(description) = &meta.description {
        operation.insert("description".into(), json!(description));
    }
    if !meta.tags.is_empty() {
        operation.insert("tags".into(), json!(meta.tags));
    }
    if spec.is_deprecated() {
        operation.insert("deprecated".into(), json!(true));
    }

    let input = spec.io.input.as_ref();
    let path_params = path_template_params(path);
    let mut parameters: Vec<JsonValue> = path_params
        .iter()
        .map(|name| {
            let schema = input
                .and_then(|model| model.fields.get(name))
                .map(field_json_schema)
                .unwrap_or_else(|| json!({"type": "string"}));
            json!({"name": name, "in": "path", "required": true, "schema": schema})
        })
        .collect();

    if let Some(input) = input {
        if method.uses_query_input() {
            for (name, field) in &input.fields {
                if path_params.contains(name) {
                    continue;
                }
                parameters.push(json!({
                    "name": name,
                    "in": "query",
                    "required": !field.is_optional,
                    "schema": field_json_schema(field),
                }));
            }
        } else {
            let component = format!("Input_{}", operation_id);
            schemas.insert(component.clone(), to_json_schema(input));
            operation.insert(
                "requestBody".into(),
                json!({
                    "required": true,
                    "content": {"application/json": {"schema": {"$ref": component_ref(&component)}}}
                }),
            );
        }
    }
    if !parameters.is_empty() {
        operation.insert("parameters".into(), JsonValue::Array(parameters));
    }

    let response = match &spec.io.output {
        Some(output) => {
            let component = format!("Output_{}", operation_id);
            schemas.insert(component.clone(), to_json_schema(output));
            json!({
                "description": "Successful response",
                "content": {"application/json": {"schema": {"$ref": component_ref(&component)}}}
            })
        }
        None => json!({"description": "Successful response"}),
    };
    operation.insert("responses".into(), json!({ "200": response }));

    if spec.policy.auth != AuthLevel::Anonymous {
        operation.insert("security".into(), json!([{ BEARER_SCHEME: [] }]));
    }
    operation.insert(
        "x-contractspec".into(),
        json!({"name": meta.name, "version": meta.version, "kind": meta.kind}),
    );
    JsonValue::Object(operation)
}

fn component_ref(name: &str) -> String {
    format!("#/components/schemas/{}", name)
}

/// Wiring code for every non-empty registry
pub fn registry_files(registries: &ContractRegistries) -> Vec<GeneratedFile> {
    let mut files = Vec::new();

    if !registries.operations.is_empty() {
        let mut imports = Vec::new();
        let mut entries = Vec::new();
        for spec in registries.operations.iter() {
            let ident = format!("{}Spec", to_lower_camel_case(&spec.meta.name));
            imports.push(format!(
                "import {{ {} }} from {};",
                ident,
                ts_string(&format!("./{}", to_kebab_case(&spec.meta.name)))
            ));
            entries.push(ident);
        }
        files.push(registry_file("operations", "OperationSpecRegistry", &imports, &entries));
    }

    let literal_entries = |values: Vec<JsonValue>| -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    };
    for (stem, class, values) in [
        ("events", "EventRegistry", to_values(&registries.events)),
        ("features", "FeatureRegistry", to_values(&registries.features)),
        ("presentations", "PresentationRegistry", to_values(&registries.presentations)),
        ("forms", "FormRegistry", to_values(&registries.forms)),
        ("dataviews", "DataViewRegistry", to_values(&registries.data_views)),
        ("workflows", "WorkflowRegistry", to_values(&registries.workflows)),
    ] {
        if !values.is_empty() {
            files.push(registry_file(stem, class, &[], &literal_entries(values)));
        }
    }
    files
}

fn to_values<T: Serialize>(entries: &[T]) -> Vec<JsonValue> {
    entries
        .iter()
        .filter_map(|entry| serde_json::to_value(entry).ok())
        .collect()
}

fn registry_file(stem: &str, class: &str, imports: &[String], entries: &[String]) -> GeneratedFile {
    let var = format!("{}Registry", to_lower_camel_case(stem));
    let mut code = String::from("// Generated by contractspec. Do not edit by hand.\n");
    code.push_str(&format!(
        "import {{ {} }} from {};\n",
        class,
        ts_string(CONTRACTS_PACKAGE)
    ));
    for import in imports {
        code.push_str(import);
        code.push('\n');
    }
    code.push_str(&format!("\nexport const {} = new {}();\n", var, class));
    for entry in entries {
        code.push_str(&format!("{}.register({});\n", var, entry));
    }
    GeneratedFile {
        file_name: format!("{}.registry.ts", stem),
        code,
    }
}
