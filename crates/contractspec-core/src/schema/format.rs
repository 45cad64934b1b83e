//! Output dialects for generated schema code.
//!
//! # Examples
//!
//! ```
//! use contractspec_core::schema::GeneratorFormat;
//! use std::str::FromStr;
//!
//! let format = GeneratorFormat::from_str("zod").unwrap();
//! assert_eq!(format, GeneratorFormat::Zod);
//! assert_eq!(format.to_string(), "zod");
//!
//! // The default dialect is the ContractSpec schema format
//! assert_eq!(GeneratorFormat::default(), GeneratorFormat::ContractSpec);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported generator dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeneratorFormat {
    /// `defineSchemaModel` declarations; hoists nested objects and enums
    #[default]
    #[serde(rename = "contractspec")]
    ContractSpec,
    /// Zod runtime validators; nested objects inline
    #[serde(rename = "zod")]
    Zod,
    /// Plain JSON Schema documents
    #[serde(rename = "json-schema", alias = "json_schema", alias = "jsonschema")]
    JsonSchema,
    /// GraphQL SDL; hoists since SDL needs named types
    #[serde(rename = "graphql")]
    Graphql,
}

impl FromStr for GeneratorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contractspec" => Ok(Self::ContractSpec),
            "zod" => Ok(Self::Zod),
            "json-schema" | "json_schema" | "jsonschema" => Ok(Self::JsonSchema),
            "graphql" | "gql" => Ok(Self::Graphql),
            _ => Err(format!("Unknown generator format: {}", s)),
        }
    }
}

impl GeneratorFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractSpec => "contractspec",
            Self::Zod => "zod",
            Self::JsonSchema => "json-schema",
            Self::Graphql => "graphql",
        }
    }

    /// Whether nested objects become named top-level declarations
    pub fn hoists_nested(&self) -> bool {
        matches!(self, Self::ContractSpec | Self::Graphql)
    }

    /// Returns an iterator over all available formats
    pub fn all() -> impl Iterator<Item = Self> {
        use GeneratorFormat::*;
        [ContractSpec, Zod, JsonSchema, Graphql].iter().copied()
    }
}

impl fmt::Display for GeneratorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
