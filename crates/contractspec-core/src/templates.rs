//! Embedded Tera templates for whole-file code generation.
//!
//! Templates ship inside the binary, so rendering never touches the
//! filesystem. The engine is built once on first use.

use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{Error, Result};

/// Template name for a ContractSpec operation module
pub const CONTRACTSPEC_OPERATION: &str = "contractspec_operation.ts";
/// Template name for a Zod operation module
pub const ZOD_OPERATION: &str = "zod_operation.ts";
/// Template name for a GraphQL operation schema
pub const GRAPHQL_OPERATION: &str = "graphql_operation.graphql";

static ENGINE: Lazy<std::result::Result<Tera, String>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (
            CONTRACTSPEC_OPERATION,
            include_str!("../templates/contractspec_operation.ts.tera"),
        ),
        (ZOD_OPERATION, include_str!("../templates/zod_operation.ts.tera")),
        (
            GRAPHQL_OPERATION,
            include_str!("../templates/graphql_operation.graphql.tera"),
        ),
    ])
    .map_err(|e| e.to_string())?;
    Ok(tera)
});

fn engine() -> Result<&'static Tera> {
    ENGINE
        .as_ref()
        .map_err(|e| Error::template(format!("Failed to load embedded templates: {}", e)))
}

/// Render an embedded template with a serializable context
pub fn render<T: Serialize>(template_name: &str, context: &T) -> Result<String> {
    let tera = engine()?;
    tera.get_template(template_name).map_err(|e| {
        Error::template(format!("Template not found: {} - {}", template_name, e))
    })?;

    let context = Context::from_serialize(context).map_err(|e| {
        Error::template(format!("Failed to serialize context: {}", e))
    })?;

    log::debug!("Rendering template: {}", template_name);
    tera.render(template_name, &context).map_err(|e| {
        log::error!("Template rendering failed for '{}': {}", template_name, e);
        Error::template(format!("Failed to render template '{}': {}", template_name, e))
    })
}

/// Names of all embedded templates
pub fn template_names() -> Vec<String> {
    match engine() {
        Ok(tera) => {
            let mut names: Vec<String> = tera.get_template_names().map(String::from).collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

/// Quote a string as a single-quoted TypeScript literal
pub fn ts_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Quote a string as a GraphQL string literal
pub fn graphql_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}
