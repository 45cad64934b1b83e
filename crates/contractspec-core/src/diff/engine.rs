//! Structural diff over serialized specs

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::sync::MatchStrategy;
use crate::contract::OperationSpec;
use crate::openapi::ParsedOperation;

/// Keys whose change means a field became required or optional
const REQUIREDNESS_KEYS: [&str; 3] = ["isOptional", "isNullable", "required"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    TypeChanged,
    RequiredChanged,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::TypeChanged => "type_changed",
            Self::RequiredChanged => "required_changed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChange {
    /// Dotted path of the changed value; empty for the whole spec
    pub path: String,
    pub change_type: ChangeType,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub description: String,
}

impl DiffChange {
    pub fn new(
        path: impl Into<String>,
        change_type: ChangeType,
        old_value: Option<JsonValue>,
        new_value: Option<JsonValue>,
    ) -> Self {
        let path = path.into();
        let description = describe(&path, change_type, old_value.as_ref(), new_value.as_ref());
        Self {
            path,
            change_type,
            old_value,
            new_value,
            description,
        }
    }
}

fn describe(path: &str, change_type: ChangeType, old: Option<&JsonValue>, new: Option<&JsonValue>) -> String {
    let target = if path.is_empty() { "spec" } else { path };
    match change_type {
        ChangeType::Added => format!("Added {}", target),
        ChangeType::Removed => format!("Removed {}", target),
        ChangeType::Modified => format!("Changed {}", target),
        ChangeType::TypeChanged => format!(
            "Type of {} changed from {} to {}",
            target,
            old.map_or("null", kind_name),
            new.map_or("null", kind_name)
        ),
        ChangeType::RequiredChanged => format!("Requiredness of {} changed", target),
    }
}

/// JSON kind of a value, used to detect type changes
pub fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiffOptions {
    /// Dotted path prefixes excluded from comparison
    pub ignore_paths: Vec<String>,
    pub ignore_descriptions: bool,
    pub ignore_tags: bool,
    pub match_strategy: MatchStrategy,
}

impl DiffOptions {
    fn is_ignored(&self, path: &str) -> bool {
        if self.ignore_paths.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .map_or(false, |rest| rest.starts_with('.'))
        }) {
            return true;
        }
        let leaf = path.rsplit('.').next().unwrap_or(path);
        (self.ignore_descriptions && leaf == "description") || (self.ignore_tags && leaf == "tags")
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

/// Recursively compare two values, appending changes under `path`
pub fn diff_values(
    old: Option<&JsonValue>,
    new: Option<&JsonValue>,
    path: &str,
    options: &DiffOptions,
    changes: &mut Vec<DiffChange>,
) {
    if !path.is_empty() && options.is_ignored(path) {
        return;
    }
    let (old, new) = match (present(old), present(new)) {
        (None, None) => return,
        (None, Some(new)) => {
            changes.push(DiffChange::new(path, ChangeType::Added, None, Some(new.clone())));
            return;
        }
        (Some(old), None) => {
            changes.push(DiffChange::new(path, ChangeType::Removed, Some(old.clone()), None));
            return;
        }
        (Some(old), Some(new)) => (old, new),
    };

    if let (JsonValue::Object(a), JsonValue::Object(b)) = (old, new) {
        for (key, value) in a {
            diff_values(Some(value), b.get(key), &join(path, key), options, changes);
        }
        for (key, value) in b {
            if !a.contains_key(key) {
                diff_values(None, Some(value), &join(path, key), options, changes);
            }
        }
        return;
    }

    if old == new {
        return;
    }
    let leaf = path.rsplit('.').next().unwrap_or(path);
    let change_type = if kind_name(old) != kind_name(new) {
        ChangeType::TypeChanged
    } else if REQUIREDNESS_KEYS.contains(&leaf) {
        ChangeType::RequiredChanged
    } else {
        ChangeType::Modified
    };
    changes.push(DiffChange::new(
        path,
        change_type,
        Some(old.clone()),
        Some(new.clone()),
    ));
}

fn spec_value(spec: &OperationSpec) -> JsonValue {
    serde_json::to_value(spec).unwrap_or(JsonValue::Null)
}

/// Compare two canonical specs field by field
pub fn diff_specs(a: &OperationSpec, b: &OperationSpec, options: &DiffOptions) -> Vec<DiffChange> {
    let mut changes = Vec::new();
    diff_values(Some(&spec_value(a)), Some(&spec_value(b)), "", options, &mut changes);
    changes
}

/// Compare a spec with the OpenAPI operation it is bound to.
///
/// Only transport-visible facts are compared: method, path (when a REST
/// override declares one), deprecation, description and tags.
pub fn diff_spec_vs_operation(spec: &OperationSpec, op: &ParsedOperation, options: &DiffOptions) -> Vec<DiffChange> {
    let mut changes = Vec::new();
    let method = spec.http_method();
    diff_values(
        Some(&json!(method)),
        Some(&json!(op.method)),
        "method",
        options,
        &mut changes,
    );
    if let Some(path) = spec.declared_path() {
        diff_values(Some(&json!(path)), Some(&json!(op.path)), "path", options, &mut changes);
    }
    diff_values(
        Some(&json!(spec.is_deprecated())),
        Some(&json!(op.deprecated)),
        "deprecated",
        options,
        &mut changes,
    );
    diff_values(
        Some(&json!(spec.meta.description)),
        Some(&json!(op.description_or_summary())),
        "meta.description",
        options,
        &mut changes,
    );
    diff_values(
        Some(&json!(spec.meta.tags)),
        Some(&json!(op.tags)),
        "meta.tags",
        options,
        &mut changes,
    );
    changes
}
