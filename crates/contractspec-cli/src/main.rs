//! contractspec CLI entrypoint
//! Parses command-line arguments and dispatches to the core library.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use contractspec_core::config::DEFAULT_CONFIG_FILE;
use contractspec_core::contract::{GeneratedFile, OperationRegistry};
use contractspec_core::diff::{
    apply_sync, build_sync_result, diff_all, format_diff_changes, format_spec_diff, format_sync_summary,
    Resolution, SpecDiff,
};
use contractspec_core::export::registry_files;
use contractspec_core::schema::GeneratorFormat;
use contractspec_core::{
    export_contract_spec, import_from_openapi, Config, ContractRegistries, DocumentLoader, ImportResult,
};
use dialoguer::Select;
use tokio::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contractspec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (YAML, JSON or TOML); defaults to ./contractspec.yaml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that reads an OpenAPI document
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path or URL to the OpenAPI document (YAML or JSON)
    ///
    /// Example: --source path/to/openapi.yaml
    /// Example: --source https://example.com/openapi.json
    #[arg(long)]
    source: String,
    /// Prefix for imported spec names (`prefix.operationId`)
    #[arg(long)]
    prefix: Option<String>,
    /// Only import operations carrying one of these tags
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
    /// Only import these operation ids
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,
    /// Skip these operation ids
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,
    /// Import deprecated operations too
    #[arg(long)]
    include_deprecated: bool,
    /// Fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Import OpenAPI operations as ContractSpec specs and generated code
    Import {
        #[command(flatten)]
        source: SourceArgs,
        /// Generator: contractspec, zod, json-schema or graphql
        #[arg(long)]
        format: Option<String>,
        /// Output directory for generated code
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Registry file to add the imported specs to
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Print what would be written without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },
    /// Export a registry file as an OpenAPI 3.1 document
    Export {
        /// Registry file (JSON or YAML)
        #[arg(long)]
        registry: PathBuf,
        /// Output document; `.json` writes JSON, anything else YAML
        #[arg(long, default_value = "openapi.yaml")]
        output: PathBuf,
        /// Document title
        #[arg(long)]
        title: Option<String>,
        /// Document version
        #[arg(long)]
        api_version: Option<String>,
        /// Server URL written into the document
        #[arg(long)]
        base_url: Option<String>,
        /// Directory for generated registry code
        #[arg(long)]
        registries_dir: Option<PathBuf>,
    },
    /// Reconcile a registry file with an OpenAPI document
    Sync {
        #[command(flatten)]
        source: SourceArgs,
        /// Registry file (JSON or YAML)
        #[arg(long)]
        registry: PathBuf,
        /// Ask how to resolve each conflict
        #[arg(long, conflicts_with = "accept_incoming")]
        interactive: bool,
        /// Resolve every conflict in favour of the document
        #[arg(long)]
        accept_incoming: bool,
        /// Report without writing the registry
        #[arg(long)]
        dry_run: bool,
    },
    /// Show differences between a registry file and an OpenAPI document
    Diff {
        #[command(flatten)]
        source: SourceArgs,
        /// Registry file (JSON or YAML)
        #[arg(long)]
        registry: PathBuf,
        /// Print structured JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the core library are bridged in
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Import {
            source,
            format,
            output_dir,
            registry,
            dry_run,
        } => {
            let mut config = source.apply(config);
            if let Some(format) = format {
                config.format = format
                    .parse::<GeneratorFormat>()
                    .map_err(|e| anyhow::anyhow!("Invalid format '{format}': {e}"))?;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir.to_string_lossy().to_string();
            }

            let result = import(&source.source, &config).await?;
            print_import_summary(&result);
            if dry_run {
                for spec in &result.specs {
                    println!("would write {}", Path::new(&config.output_dir).join(&spec.file_name).display());
                }
                return Ok(());
            }

            let files: Vec<GeneratedFile> = result.specs.iter().map(|s| s.as_generated_file()).collect();
            write_files(Path::new(&config.output_dir), &files).await?;

            if let Some(path) = registry {
                let mut registries = read_registries_or_default(&path).await?;
                for spec in result.specs.iter().filter_map(|s| s.spec.live()) {
                    registries.operations.upsert(spec.clone());
                }
                registries
                    .save(&path)
                    .await
                    .with_context(|| format!("Failed to write registry {}", path.display()))?;
                tracing::info!("Registry {} now holds {} operations", path.display(), registries.operations.len());
            }
        }
        Commands::Export {
            registry,
            output,
            title,
            api_version,
            base_url,
            registries_dir,
        } => {
            let registries = ContractRegistries::from_file(&registry)
                .await
                .with_context(|| format!("Failed to read registry {}", registry.display()))?;

            let mut config = config;
            if let Some(url) = base_url {
                config.base_url = Some(url.parse().with_context(|| format!("Invalid base URL '{url}'"))?);
            }
            if title.is_some() {
                config.title = title;
            }
            let mut options = config.export_options();
            if let Some(version) = api_version {
                options.version = version;
            }

            let result = export_contract_spec(&registries, &options);
            let content = if output.extension().map_or(false, |ext| ext == "json") {
                result.to_json()?
            } else {
                result.to_yaml()?
            };
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&output, content)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Exported {} operations to {}", registries.operations.len(), output.display());

            if let Some(dir) = registries_dir {
                let files = result.registries.unwrap_or_else(|| registry_files(&registries));
                write_files(&dir, &files).await?;
            }
        }
        Commands::Sync {
            source,
            registry,
            interactive,
            accept_incoming,
            dry_run,
        } => {
            let config = source.apply(config);
            let result = import(&source.source, &config).await?;
            let mut registries = read_registries_or_default(&registry).await?;
            let mut diffs = diff_all(registries.operations.specs(), &result.specs, &config.diff_options());

            for diff in diffs.iter_mut().filter(|d| d.needs_resolution()) {
                if accept_incoming {
                    diff.resolve(Resolution::UseIncoming);
                } else if interactive {
                    diff.resolve(prompt_resolution(diff)?);
                }
            }

            let summary = if dry_run {
                build_sync_result(&diffs)
            } else {
                let summary = apply_sync(&mut registries.operations, &diffs);
                registries
                    .save(&registry)
                    .await
                    .with_context(|| format!("Failed to write registry {}", registry.display()))?;
                summary
            };
            print!("{}", format_sync_summary(&summary));
            for conflict in &summary.conflicts {
                print!("{}", format_spec_diff(conflict));
            }
            if summary.has_conflicts() {
                tracing::warn!("{} conflicts left unresolved; rerun with --interactive or --accept-incoming", summary.conflicts.len());
            }
        }
        Commands::Diff {
            source,
            registry,
            json,
        } => {
            let config = source.apply(config);
            let result = import(&source.source, &config).await?;
            let registries = read_registries_or_default(&registry).await?;
            let diffs = diff_all(registries.operations.specs(), &result.specs, &config.diff_options());
            if json {
                println!("{}", serde_json::to_string_pretty(&diffs)?);
            } else {
                print_diffs(&diffs);
            }
        }
    }
    Ok(())
}

impl SourceArgs {
    /// Layer command-line flags over the config file
    fn apply(&self, mut config: Config) -> Config {
        if self.prefix.is_some() {
            config.prefix = self.prefix.clone();
        }
        if !self.tags.is_empty() {
            config.tags = self.tags.clone();
        }
        if !self.include.is_empty() {
            config.include_operations = self.include.clone();
        }
        if !self.exclude.is_empty() {
            config.exclude_operations = self.exclude.clone();
        }
        config.include_deprecated |= self.include_deprecated;
        if let Some(timeout) = self.timeout {
            config.fetch_timeout_secs = timeout;
        }
        config
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::from_file(DEFAULT_CONFIG_FILE)
            .await
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG_FILE)),
        None => Ok(Config::default()),
    }
}

async fn import(location: &str, config: &Config) -> anyhow::Result<ImportResult> {
    tracing::info!("Loading OpenAPI document from: {}", location);
    let loaded = DocumentLoader::new()
        .with_timeout(config.fetch_timeout())
        .load(location)
        .await
        .with_context(|| format!("Failed to load {}", location))?;

    let parsed = loaded.document.parse();
    for warning in &parsed.warnings {
        tracing::warn!("{}", warning);
    }
    let mut options = config.import_options();
    options.source = loaded.origin;
    Ok(import_from_openapi(&parsed, &options))
}

async fn read_registries_or_default(path: &Path) -> anyhow::Result<ContractRegistries> {
    if !path.exists() {
        tracing::info!("Registry {} does not exist yet; starting empty", path.display());
        return Ok(ContractRegistries::with_operations(OperationRegistry::new()));
    }
    ContractRegistries::from_file(path)
        .await
        .with_context(|| format!("Failed to read registry {}", path.display()))
}

async fn write_files(dir: &Path, files: &[GeneratedFile]) -> anyhow::Result<()> {
    for file in files {
        let target = dir.join(&file.file_name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&target, &file.code)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        tracing::debug!("Wrote {}", target.display());
    }
    Ok(())
}

fn print_import_summary(result: &ImportResult) {
    let summary = &result.summary;
    println!(
        "{} operations: {} imported, {} skipped, {} failed",
        summary.total, summary.imported, summary.skipped, summary.errors
    );
    for skipped in &result.skipped {
        println!("  skipped {}: {}", skipped.operation_id, skipped.reason);
    }
    for failure in &result.errors {
        println!("  failed {}: {}", failure.operation_id, failure.message);
    }
}

fn print_diffs(diffs: &[SpecDiff]) {
    let changed: Vec<&SpecDiff> = diffs.iter().filter(|d| !d.is_equivalent()).collect();
    if changed.is_empty() {
        print!("{}", format_diff_changes(&[]));
        return;
    }
    for diff in changed {
        print!("{}", format_spec_diff(diff));
    }
}

fn prompt_resolution(diff: &SpecDiff) -> anyhow::Result<Resolution> {
    print!("{}", format_spec_diff(diff));
    let incoming_label = if diff.incoming().is_some() {
        "Use the document's version"
    } else {
        "Remove it from the registry"
    };
    let choice = Select::new()
        .with_prompt(format!("Resolve {}", diff.operation_id()))
        .items(&["Keep the registry's version", incoming_label])
        .default(0)
        .interact()?;
    Ok(if choice == 0 {
        Resolution::KeepExisting
    } else {
        Resolution::UseIncoming
    })
}
