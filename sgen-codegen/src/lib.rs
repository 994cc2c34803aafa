//! sgen-codegen: Generate a storage layer from Rust struct declarations
//!
//! This crate provides both a CLI tool and a library. It parses the structs of
//! a declarations directory with `syn` and deploys:
//!
//! - a query builder module and a database driver module for the configured
//!   SQL dialect (copied from templates)
//! - one storage module per struct with CRUD functions on top of both
//!
//! Every generated file is recorded against the struct that produced it in an
//! ownership ledger, so files of structs that disappear are reported (and
//! optionally deleted) on the next run.
//!
//! It also ships a line patcher that splices a snippet into an existing file
//! after every line matching a regex.
//!
//! # Usage in build.rs (Recommended)
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.sgen]
//! data_dir = "src/models"
//! sql_dialect = "postgresql"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     sgen_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate storages");
//! }
//! ```
//!
//! Include the generated code in your crate root (`src/main.rs` or `src/lib.rs`):
//!
//! ```rust,ignore
//! mod models;
//! mod database {
//!     include!(concat!(env!("OUT_DIR"), "/database/mod.rs"));
//! }
//! ```
//!
//! # Alternative: Programmatic Configuration
//!
//! ```rust,ignore
//! fn main() {
//!     sgen_codegen::GeneratorBuilder::new("src/models")
//!         .output_dir("src/database")
//!         .auto_delete(true)
//!         .generate()
//!         .expect("Failed to generate storages");
//!
//!     println!("cargo:rerun-if-changed=src/models");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! sgen --data ./src/models --output ./src/database generate
//! sgen inject --file src/main.rs --pattern '^use ' --snippet 'use crate::database;'
//! ```

pub mod codegen;
pub mod config;
pub mod deploy;
pub mod error;
pub mod files;
pub mod formatter;
pub mod parser;
pub mod patch;
pub mod register;
pub mod validator;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use codegen::{Renderer, StorageRenderer};
use deploy::Deployer;
use formatter::{CommandFormatter, NoopFormatter, SourceFormatter};
use patch::{LinePatcher, PatchReport, PatchRequest};
use register::{ArtifactRegister, LedgerStore, TomlLedgerStore};

pub use config::{GeneratorConfig, SqlDialect};
pub use deploy::DeployReport;
pub use error::{CodegenError, GenerationErrors, Result, Stage};

/// What a generation run did (or, for a dry run, would do)
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    /// Entities found in the declarations
    pub entities: usize,
    /// Generated files, under the output base
    pub files: Vec<PathBuf>,
    /// Deployment outcome; `None` for a dry run
    pub deployment: Option<DeployReport>,
}

/// Main entry point for code generation, keeping the ledger in `register_file`
pub fn generate(config: &GeneratorConfig) -> Result<GenerationSummary> {
    generate_with_store(config, TomlLedgerStore::new(&config.register_file))
}

/// Run the generation pipeline with the ledger kept in `store`.
///
/// Parsing and validation report every problem they find; if either reports
/// anything nothing is written. Failures are returned as
/// [`CodegenError::Generation`], grouped by stage.
pub fn generate_with_store<S: LedgerStore>(
    config: &GeneratorConfig,
    store: S,
) -> Result<GenerationSummary> {
    let mut register = ArtifactRegister::load(store)?;
    let mut errors = GenerationErrors::new();

    info!("Parsing declarations: {}", config.data_dir.display());
    let collection = match parser::parse_dir(&config.data_dir, &config.models_module) {
        Ok((collection, parse_errors)) => {
            errors.extend(Stage::Parsing, parse_errors);
            collection
        }
        Err(e) => {
            errors.push(Stage::Parsing, e);
            return Err(errors.into());
        }
    };
    info!("Found {} entities", collection.entities.len());

    errors.extend(Stage::Validating, validator::validate(&collection));
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let files = match StorageRenderer::new(config).render(&collection) {
        Ok(files) => files,
        Err(e) => {
            errors.push(Stage::Templating, e);
            return Err(errors.into());
        }
    };

    let mut summary = GenerationSummary {
        entities: collection.entities.len(),
        files: files
            .iter()
            .map(|f| f.path_in(&config.database_dir))
            .collect(),
        deployment: None,
    };

    if config.dry_run {
        for path in &summary.files {
            info!("Would write {}", path.display());
        }
        return Ok(summary);
    }

    let formatter = formatter_for(config);
    let report = Deployer::new(config, formatter.as_ref())
        .deploy(&collection.package, &files, &mut register)
        .map_err(CodegenError::from)?;

    info!(
        "Code generation complete: {} file(s) written, {} orphan(s), {} removed",
        report.written.len(),
        report.orphans.len(),
        report.removed.len()
    );
    summary.deployment = Some(report);
    Ok(summary)
}

/// Splice `request.snippet` into `request.path`, formatting the result with
/// the configured formatter
pub fn inject(config: &GeneratorConfig, request: &PatchRequest) -> Result<PatchReport> {
    let formatter = formatter_for(config);
    LinePatcher::new(formatter.as_ref()).apply(request)
}

fn formatter_for(config: &GeneratorConfig) -> Box<dyn SourceFormatter> {
    if config.format_generated {
        Box::new(CommandFormatter::new(config.formatter.clone()))
    } else {
        Box::new(NoopFormatter)
    }
}

/// Builder pattern for easy configuration in build.rs
pub struct GeneratorBuilder {
    config: GeneratorConfig,
}

impl GeneratorBuilder {
    /// Create a new builder reading declarations from `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            config: GeneratorConfig::default_with_data_dir(data_dir.as_ref().to_path_buf()),
        }
    }

    /// Set the output base directory
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.database_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the directory holding the query builder and driver templates
    pub fn template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.template_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn sql_dialect(mut self, dialect: SqlDialect) -> Self {
        self.config.sql_dialect = dialect;
        self
    }

    /// Remove files whose owner disappeared since the previous run
    pub fn auto_delete(mut self, enabled: bool) -> Self {
        self.config.auto_delete = enabled;
        self
    }

    /// Set the ownership ledger location
    pub fn register_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config.register_file = path.as_ref().to_path_buf();
        self
    }

    /// Set the models module path
    pub fn models_module(mut self, name: &str) -> Self {
        self.config.models_module = name.to_string();
        self
    }

    /// Set the generated database module path
    pub fn database_module(mut self, name: &str) -> Self {
        self.config.database_module = name.to_string();
        self
    }

    /// Skip the formatter pass over written files
    pub fn skip_formatting(mut self) -> Self {
        self.config.format_generated = false;
        self
    }

    /// Set the formatter binary
    pub fn formatter(mut self, program: &str) -> Self {
        self.config.formatter = program.to_string();
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Validate the configuration and generate the code
    pub fn generate(self) -> Result<GenerationSummary> {
        self.config.validate()?;
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.sgen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Directory of the struct declarations (required)
    data_dir: Option<String>,

    /// Output base directory (default: `$OUT_DIR/database`)
    output_dir: Option<String>,

    /// Template directory (default: the templates shipped with sgen)
    template_dir: Option<String>,

    /// SQL dialect (default: mysql)
    sql_dialect: Option<String>,

    /// Remove orphaned files (default: false)
    auto_delete: Option<bool>,

    /// Ledger location (default: `$OUT_DIR/sgen-register.toml`)
    register_file: Option<String>,

    /// Module path of the declarations (default: "models")
    models_module: Option<String>,

    /// Module path of the generated code (default: "database")
    database_module: Option<String>,

    /// Whether to run the formatter (default: true)
    format_generated: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    sgen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.sgen]` in Cargo.toml
///
/// This function reads configuration from the downstream project's Cargo.toml,
/// making build.rs minimal:
///
/// ```rust,ignore
/// // build.rs
/// fn main() {
///     sgen_codegen::generate_from_cargo_metadata()
///         .expect("Failed to generate storages");
/// }
/// ```
///
/// Relative paths are resolved against the manifest directory; outputs
/// default to `OUT_DIR`.
pub fn generate_from_cargo_metadata() -> Result<GenerationSummary> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map(PathBuf::from).map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;
    let out_dir = std::env::var("OUT_DIR").map(PathBuf::from).map_err(|_| {
        CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
    })?;

    let cargo_toml_path = manifest_dir.join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)
        .map_err(|e| CodegenError::file(&cargo_toml_path, e))?;
    let metadata_config = metadata_from_manifest(&cargo_toml_content, &cargo_toml_path)?;

    let builder = builder_from_metadata(metadata_config, &manifest_dir, &out_dir)?;

    println!(
        "cargo:rerun-if-changed={}",
        builder.config().data_dir.display()
    );
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    builder.generate()
}

fn metadata_from_manifest(content: &str, path: &Path) -> Result<CargoMetadataConfig> {
    let cargo_toml: CargoToml = toml::from_str(content).map_err(|e| {
        CodegenError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.sgen)
        .ok_or_else(|| {
            CodegenError::ConfigError("Missing [package.metadata.sgen] section in Cargo.toml".into())
        })
}

fn builder_from_metadata(
    metadata: CargoMetadataConfig,
    manifest_dir: &Path,
    out_dir: &Path,
) -> Result<GeneratorBuilder> {
    let data_dir = metadata.data_dir.ok_or_else(|| {
        CodegenError::ConfigError("data_dir is required in [package.metadata.sgen]".into())
    })?;

    let mut builder = GeneratorBuilder::new(manifest_dir.join(data_dir))
        .output_dir(
            metadata
                .output_dir
                .map(|dir| manifest_dir.join(dir))
                .unwrap_or_else(|| out_dir.join("database")),
        )
        .register_file(
            metadata
                .register_file
                .map(|file| manifest_dir.join(file))
                .unwrap_or_else(|| out_dir.join("sgen-register.toml")),
        );

    if let Some(dir) = metadata.template_dir {
        builder = builder.template_dir(manifest_dir.join(dir));
    }
    if let Some(dialect) = metadata.sql_dialect {
        builder = builder.sql_dialect(SqlDialect::from_name(&dialect));
    }
    if let Some(enabled) = metadata.auto_delete {
        builder = builder.auto_delete(enabled);
    }
    if let Some(module) = metadata.models_module {
        builder = builder.models_module(&module);
    }
    if let Some(module) = metadata.database_module {
        builder = builder.database_module(&module);
    }
    if let Some(false) = metadata.format_generated {
        builder = builder.skip_formatting();
    }

    debug!("Configuration from Cargo metadata: {:?}", builder.config());
    Ok(builder)
}
