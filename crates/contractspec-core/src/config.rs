//! Configuration management for ContractSpec transformations.
//!
//! This module defines the `Config` struct holding the settings shared by the
//! import, export and sync commands. The configuration can be loaded from a
//! YAML, JSON or TOML file, created programmatically, or overridden from
//! command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use contractspec_core::config::Config;
//! use contractspec_core::schema::GeneratorFormat;
//!
//! // Create a new config programmatically
//! let mut config = Config::new("generated");
//! config.format = GeneratorFormat::Zod;
//! config.prefix = Some("billing".to_string());
//!
//! // Or load from a config file
//! # async fn load() -> contractspec_core::Result<()> {
//! let config = Config::from_file("contractspec.yaml").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

use crate::contract::Stability;
use crate::diff::{DiffOptions, MatchStrategy};
use crate::export::ExportOptions;
use crate::import::ImportOptions;
use crate::openapi::ServerInfo;
use crate::schema::GeneratorFormat;
use crate::Error;

/// Default config file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "contractspec.yaml";

/// Settings for ContractSpec import, export and sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generator used for imported operations
    pub format: GeneratorFormat,

    /// Output directory for generated code
    pub output_dir: String,

    /// Seconds before a remote fetch is abandoned
    pub fetch_timeout_secs: u64,

    /// Prepended to imported spec names as `prefix.name`
    pub prefix: Option<String>,

    /// Stability given to operations that are not deprecated
    pub default_stability: Stability,

    /// Tag allow-list for imports
    pub tags: Vec<String>,

    /// Operation ids to import; overrides `exclude_operations`
    pub include_operations: Vec<String>,

    /// Operation ids to skip
    pub exclude_operations: Vec<String>,

    pub include_deprecated: bool,

    /// Dotted path prefixes ignored when diffing
    pub ignore_paths: Vec<String>,

    pub ignore_descriptions: bool,

    pub match_strategy: MatchStrategy,

    /// Title of exported OpenAPI documents
    pub title: Option<String>,

    /// Base URL written as the exported server (Optional)
    pub base_url: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new("generated")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            format: GeneratorFormat::default(),
            output_dir: output_dir.into(),
            fetch_timeout_secs: 30,
            prefix: None,
            default_stability: Stability::default(),
            tags: Vec::new(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
            include_deprecated: false,
            ignore_paths: Vec::new(),
            ignore_descriptions: false,
            match_strategy: MatchStrategy::default(),
            title: None,
            base_url: None,
        }
    }

    /// Load configuration from a file; the format follows the extension
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = match ConfigFormat::of(path) {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::of(path) {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string(self).map_err(|e| Error::config(e.to_string()))?,
        };
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            format: self.format,
            prefix: self.prefix.clone(),
            tags: self.tags.clone(),
            include: self.include_operations.clone(),
            exclude: self.exclude_operations.clone(),
            include_deprecated: self.include_deprecated,
            default_stability: self.default_stability,
            ..ImportOptions::default()
        }
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            ignore_paths: self.ignore_paths.clone(),
            ignore_descriptions: self.ignore_descriptions,
            match_strategy: self.match_strategy,
            ..DiffOptions::default()
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        let mut options = ExportOptions::default();
        if let Some(title) = &self.title {
            options.title = title.clone();
        }
        options.servers = self
            .base_url
            .iter()
            .map(|url| ServerInfo {
                url: url.to_string(),
                description: None,
            })
            .collect();
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> Config {
        let mut config = Config::new("out");
        config.format = GeneratorFormat::Graphql;
        config.prefix = Some("billing".into());
        config.tags = vec!["invoices".into()];
        config.ignore_paths = vec!["meta.owners".into()];
        config.match_strategy = MatchStrategy::Contains;
        config.base_url = Url::parse("https://api.example.com/v1").ok();
        config
    }

    #[tokio::test]
    async fn test_config_roundtrip_each_format() -> crate::Result<()> {
        let dir = tempdir()?;
        let config = sample();
        for name in ["config.yaml", "config.json", "config.toml"] {
            let file_path = dir.path().join(name);
            config.save(&file_path).await?;
            let loaded = Config::from_file(&file_path).await?;
            assert_eq!(loaded, config);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("contractspec.yaml");
        fs::write(&file_path, "format: zod\nprefix: shop\n").await?;

        let config = Config::from_file(&file_path).await?;
        assert_eq!(config.format, GeneratorFormat::Zod);
        assert_eq!(config.output_dir, "generated");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.import_options().prefix.as_deref(), Some("shop"));
        Ok(())
    }

    #[test]
    fn test_derived_options() {
        let config = sample();
        let import = config.import_options();
        assert_eq!(import.format, GeneratorFormat::Graphql);
        assert_eq!(import.tags, vec!["invoices"]);
        assert!(import.emit_live_spec);

        let diff = config.diff_options();
        assert_eq!(diff.ignore_paths, vec!["meta.owners"]);
        assert_eq!(diff.match_strategy, MatchStrategy::Contains);

        let export = config.export_options();
        assert_eq!(export.title, "ContractSpec API");
        assert_eq!(export.servers[0].url, "https://api.example.com/v1");
    }
}
