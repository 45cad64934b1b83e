//! Raw OpenAPI document handling and local `$ref` resolution.
//!
//! The whole parsed document acts as an arena: references are string
//! pointers into it and are followed lazily on lookup, never materialized as
//! live links. Unresolvable pointers (external files, typos) pass through
//! untouched so downstream conversion can degrade them to an unknown type.
//!
//! # Examples
//!
//! ```
//! use contractspec_core::openapi::OpenApiDocument;
//!
//! let doc = OpenApiDocument::parse_content(
//!     r#"{"openapi": "3.1.0", "info": {"title": "Widgets", "version": "1.0.0"}, "paths": {}}"#,
//!     None,
//! )?;
//! assert_eq!(doc.title(), Some("Widgets"));
//! # Ok::<(), contractspec_core::Error>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{Error, Result};

/// Serialization format of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Sniff the format from the first non-whitespace character
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') | Some('[') => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Infer the format from a file or URL path extension
    pub fn from_extension(location: &str) -> Option<Self> {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// An OpenAPI document held as raw JSON
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OpenApiDocument {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl OpenApiDocument {
    /// Wrap an already-parsed value
    pub fn new(json: JsonValue) -> Self {
        Self { json }
    }

    /// Rebuild a minimal document holding only `components.schemas`.
    ///
    /// Enough to resolve `#/components/schemas/..` references once the full
    /// document has been parsed and dropped.
    pub fn from_components<'a, I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a JsonValue)>,
    {
        let schemas: Map<String, JsonValue> = schemas
            .into_iter()
            .map(|(name, schema)| (name.clone(), schema.clone()))
            .collect();
        let mut components = Map::new();
        components.insert("schemas".to_string(), JsonValue::Object(schemas));
        let mut root = Map::new();
        root.insert("components".to_string(), JsonValue::Object(components));
        Self::new(JsonValue::Object(root))
    }

    /// Parse content as JSON or YAML.
    ///
    /// Without a hint the format is sniffed from the content.
    pub fn parse_content(content: &str, hint: Option<DocumentFormat>) -> Result<Self> {
        let format = hint.unwrap_or_else(|| DocumentFormat::sniff(content));
        let json: JsonValue = match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Yaml => yaml_to_json(serde_yaml::from_str(content)?)?,
        };
        if !json.is_object() {
            return Err(Error::openapi("document root must be an object"));
        }
        Ok(Self { json })
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// The `openapi` version string
    pub fn openapi_version(&self) -> Option<&str> {
        self.json.get("openapi")?.as_str()
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// The `paths` object, if present
    pub fn paths(&self) -> Option<&Map<String, JsonValue>> {
        self.json.get("paths")?.as_object()
    }

    /// Look up a local `#/...` pointer. External references return `None`.
    pub fn lookup(&self, reference: &str) -> Option<&JsonValue> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            return Some(&self.json);
        }
        self.json.pointer(pointer)
    }

    /// Follow a chain of `$ref`s starting at `node`.
    ///
    /// Returns the first node that is not a resolvable reference. A chain
    /// that revisits a pointer is a [`Error::CyclicReference`].
    pub fn resolve<'a>(&'a self, node: &'a JsonValue) -> Result<&'a JsonValue> {
        let mut current = node;
        let mut chain: Vec<&str> = Vec::new();
        while let Some(reference) = ref_of(current) {
            if chain.contains(&reference) {
                chain.push(reference);
                return Err(Error::CyclicReference(chain.join(" -> ")));
            }
            match self.lookup(reference) {
                Some(target) => {
                    chain.push(reference);
                    current = target;
                }
                None => {
                    log::debug!("leaving unresolved reference {}", reference);
                    break;
                }
            }
        }
        Ok(current)
    }

    /// Inline every resolvable local `$ref` below `schema`.
    ///
    /// Sibling references to the same target are fine; a reference reached
    /// again while it is still being expanded is a cycle and fails.
    pub fn dereference(&self, schema: &JsonValue) -> Result<JsonValue> {
        let mut stack = Vec::new();
        self.dereference_inner(schema, &mut stack)
    }

    fn dereference_inner(&self, node: &JsonValue, stack: &mut Vec<String>) -> Result<JsonValue> {
        match node {
            JsonValue::Object(map) => {
                if let Some(reference) = ref_of(node) {
                    if stack.iter().any(|r| r == reference) {
                        let mut chain = stack.clone();
                        chain.push(reference.to_string());
                        return Err(Error::CyclicReference(chain.join(" -> ")));
                    }
                    return match self.lookup(reference) {
                        Some(target) => {
                            stack.push(reference.to_string());
                            let expanded = self.dereference_inner(target, stack);
                            stack.pop();
                            expanded
                        }
                        None => Ok(node.clone()),
                    };
                }
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.dereference_inner(value, stack)?);
                }
                Ok(JsonValue::Object(out))
            }
            JsonValue::Array(items) => items
                .iter()
                .map(|item| self.dereference_inner(item, stack))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }
}

/// Convert YAML to JSON, stringifying non-string mapping keys such as
/// unquoted `200:` status codes.
fn yaml_to_json(value: serde_yaml::Value) -> Result<JsonValue> {
    use serde_yaml::Value as Yaml;
    Ok(match value {
        Yaml::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => serde_yaml::to_string(&other)?.trim_end().to_string(),
                };
                out.insert(key, yaml_to_json(value)?);
            }
            JsonValue::Object(out)
        }
        Yaml::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
        other => serde_json::to_value(other)?,
    })
}

/// The `$ref` string of a node, if it is a reference
pub fn ref_of(node: &JsonValue) -> Option<&str> {
    node.get("$ref")?.as_str()
}

/// Last segment of a reference, e.g. `Pet` for `#/components/schemas/Pet`
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: JsonValue) -> OpenApiDocument {
        OpenApiDocument::new(json)
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(DocumentFormat::sniff("  {\"a\": 1}"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::sniff("\n[1]"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::sniff("openapi: 3.0.0"), DocumentFormat::Yaml);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("spec.JSON"), Some(DocumentFormat::Json));
        assert_eq!(
            DocumentFormat::from_extension("https://x.io/api/openapi.yml?v=2"),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_extension("https://x.io/api"), None);
    }

    #[test]
    fn test_parse_yaml_content() -> Result<()> {
        let parsed = OpenApiDocument::parse_content(
            "openapi: 3.0.3\ninfo:\n  title: Pets\n  version: '2'\npaths: {}\n",
            None,
        )?;
        assert_eq!(parsed.openapi_version(), Some("3.0.3"));
        assert_eq!(parsed.title(), Some("Pets"));
        assert_eq!(parsed.version(), Some("2"));
        Ok(())
    }

    #[test]
    fn test_parse_yaml_numeric_keys() -> Result<()> {
        let parsed = OpenApiDocument::parse_content(
            "openapi: 3.0.3\npaths:\n  /a:\n    get:\n      responses:\n        200:\n          description: ok\n",
            Some(DocumentFormat::Yaml),
        )?;
        assert_eq!(
            parsed.json["paths"]["/a"]["get"]["responses"]["200"]["description"],
            "ok"
        );
        Ok(())
    }

    #[test]
    fn test_parse_rejects_scalar_root() {
        assert!(OpenApiDocument::parse_content("42", Some(DocumentFormat::Json)).is_err());
    }

    #[test]
    fn test_lookup_with_escaped_pointer() {
        let d = doc(json!({"paths": {"/a/b": {"get": {"x": 1}}}}));
        assert_eq!(d.lookup("#/paths/~1a~1b/get/x"), Some(&json!(1)));
        assert_eq!(d.lookup("other.yaml#/x"), None);
    }

    #[test]
    fn test_resolve_follows_chain() -> Result<()> {
        let d = doc(json!({
            "components": {
                "parameters": {
                    "Limit": {"$ref": "#/components/parameters/Real"},
                    "Real": {"name": "limit", "in": "query"}
                }
            }
        }));
        let node = json!({"$ref": "#/components/parameters/Limit"});
        assert_eq!(d.resolve(&node)?["name"], "limit");
        Ok(())
    }

    #[test]
    fn test_resolve_passes_through_external_ref() -> Result<()> {
        let d = doc(json!({}));
        let node = json!({"$ref": "common.yaml#/Limit"});
        assert_eq!(d.resolve(&node)?, &node);
        Ok(())
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let d = doc(json!({"components": {"schemas": {
            "A": {"$ref": "#/components/schemas/B"},
            "B": {"$ref": "#/components/schemas/A"}
        }}}));
        let node = json!({"$ref": "#/components/schemas/A"});
        assert!(matches!(d.resolve(&node), Err(Error::CyclicReference(_))));
    }

    #[test]
    fn test_dereference_inlines_shared_refs() -> Result<()> {
        let d = doc(json!({"components": {"schemas": {
            "Money": {"type": "number"}
        }}}));
        let schema = json!({
            "type": "object",
            "properties": {
                "price": {"$ref": "#/components/schemas/Money"},
                "tax": {"$ref": "#/components/schemas/Money"},
                "ext": {"$ref": "#/components/schemas/Missing"}
            }
        });
        let out = d.dereference(&schema)?;
        assert_eq!(out["properties"]["price"], json!({"type": "number"}));
        assert_eq!(out["properties"]["tax"], json!({"type": "number"}));
        assert_eq!(
            out["properties"]["ext"],
            json!({"$ref": "#/components/schemas/Missing"})
        );
        Ok(())
    }

    #[test]
    fn test_dereference_rejects_recursive_schema() {
        let d = doc(json!({"components": {"schemas": {
            "Node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}}
            }
        }}}));
        let schema = json!({"$ref": "#/components/schemas/Node"});
        let err = d.dereference(&schema).unwrap_err();
        assert!(err.to_string().contains("#/components/schemas/Node"));
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/Pet"), "Pet");
    }

    #[test]
    fn test_from_components_resolves_schema_refs() -> Result<()> {
        let mut schemas = indexmap::IndexMap::new();
        schemas.insert("Id".to_string(), json!({"type": "string", "format": "uuid"}));
        let d = OpenApiDocument::from_components(&schemas);
        let expanded = d.dereference(&json!({"$ref": "#/components/schemas/Id"}))?;
        assert_eq!(expanded, json!({"type": "string", "format": "uuid"}));
        Ok(())
    }
}
