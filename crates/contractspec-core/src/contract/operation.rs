//! Canonical operation specs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::openapi::HttpMethod;
use crate::schema::SchemaModel;

/// Whether an operation changes state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Command,
    Query,
}

impl OpKind {
    /// Kind inferred from an HTTP method: reads are queries
    pub fn from_method(method: HttpMethod) -> Self {
        if method.is_read_only() {
            Self::Query
        } else {
            Self::Command
        }
    }

    /// Method used when a spec carries no transport override
    pub fn default_method(&self) -> HttpMethod {
        match self {
            Self::Command => HttpMethod::Post,
            Self::Query => HttpMethod::Get,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle stage of a spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Experimental,
    #[default]
    Beta,
    Stable,
    Deprecated,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experimental => "experimental",
            Self::Beta => "beta",
            Self::Stable => "stable",
            Self::Deprecated => "deprecated",
        }
    }
}

impl FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "experimental" => Ok(Self::Experimental),
            "beta" => Ok(Self::Beta),
            "stable" => Ok(Self::Stable),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(format!("Unknown stability: {}", s)),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who may call an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    Anonymous,
    #[default]
    User,
    Admin,
}

impl AuthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMeta {
    /// Dotted canonical name, e.g. `billing.createInvoice`
    pub name: String,
    pub version: u32,
    pub kind: OpKind,
    #[serde(default)]
    pub stability: Stability,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationIo {
    #[serde(default)]
    pub input: Option<SchemaModel>,
    #[serde(default)]
    pub output: Option<SchemaModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    #[serde(default)]
    pub auth: AuthLevel,
}

/// Explicit REST binding that replaces the kind-derived defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestOverride {
    #[serde(default)]
    pub method: Option<HttpMethod>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportOverride {
    #[serde(default)]
    pub rest: Option<RestOverride>,
}

/// One command or query in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    pub meta: SpecMeta,
    #[serde(default)]
    pub io: OperationIo,
    #[serde(default)]
    pub policy: PolicySpec,
    #[serde(default)]
    pub transport: TransportOverride,
}

impl OperationSpec {
    /// Registry key, `name.v{version}`
    pub fn key(&self) -> String {
        format!("{}.v{}", self.meta.name, self.meta.version)
    }

    /// Method from the transport override, else the kind default
    pub fn http_method(&self) -> HttpMethod {
        self.rest_override()
            .and_then(|rest| rest.method)
            .unwrap_or_else(|| self.meta.kind.default_method())
    }

    /// Path declared by the transport override, if any
    pub fn declared_path(&self) -> Option<&str> {
        self.rest_override().and_then(|rest| rest.path.as_deref())
    }

    /// Path from the transport override, else `/{name with '.' as '/'}/v{version}`
    pub fn http_path(&self) -> String {
        match self.declared_path() {
            Some(path) => path.to_string(),
            None => format!("/{}/v{}", self.meta.name.replace('.', "/"), self.meta.version),
        }
    }

    /// `operationId` used when exporting to OpenAPI
    pub fn export_operation_id(&self) -> String {
        format!("{}_v{}", self.meta.name.replace('.', "_"), self.meta.version)
    }

    pub fn is_deprecated(&self) -> bool {
        self.meta.stability == Stability::Deprecated
    }

    fn rest_override(&self) -> Option<&RestOverride> {
        self.transport.rest.as_ref()
    }
}

#[cfg(test)]
pub(crate) fn sample_spec(name: &str, kind: OpKind) -> OperationSpec {
    OperationSpec {
        meta: SpecMeta {
            name: name.to_string(),
            version: 1,
            kind,
            stability: Stability::Beta,
            description: None,
            goal: None,
            tags: vec![],
            owners: vec![],
        },
        io: OperationIo::default(),
        policy: PolicySpec::default(),
        transport: TransportOverride::default(),
    }
}
