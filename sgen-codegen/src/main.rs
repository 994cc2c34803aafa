//! CLI entry point for sgen

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sgen_codegen::config::GeneratorConfig;
use sgen_codegen::patch::{PatchRequest, Scope};
use sgen_codegen::register::{ArtifactRegister, TomlLedgerStore};

#[derive(Parser)]
#[command(name = "sgen")]
#[command(about = "Generate a storage layer from Rust struct declarations")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of the struct declarations (overrides config)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output base directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and deploy the storage layer
    Generate,
    /// Insert a snippet into an existing file at the lines matching a pattern
    Inject {
        /// File to patch
        #[arg(short, long)]
        file: PathBuf,
        /// Regular expression matched against every line
        #[arg(short, long)]
        pattern: String,
        /// Text to insert
        #[arg(short, long)]
        snippet: String,
        /// Where the snippet goes
        #[arg(long, value_enum, default_value_t = ScopeArg::Declaration)]
        scope: ScopeArg,
    },
    /// Inspect declarations (show parsed entities for debugging)
    Inspect,
    /// Show the ownership ledger of the previous run
    Ledger,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    /// Prefix the matched content on the matching line
    File,
    /// Add the snippet as a new line after every matching line
    Declaration,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::File => Scope::WholeFile,
            ScopeArg::Declaration => Scope::Declaration,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(data) = cli.data {
        config.data_dir = data;
    }
    if let Some(output) = cli.output {
        config.database_dir = output;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => generate(&config),
        Commands::Inject {
            file,
            pattern,
            snippet,
            scope,
        } => inject(&config, PatchRequest::new(file, pattern, snippet, scope.into())),
        Commands::Inspect => inspect_declarations(&config),
        Commands::Ledger => show_ledger(&config),
    }
}

fn generate(config: &GeneratorConfig) -> Result<()> {
    config.validate()?;

    info!("Generating storages from: {}", config.data_dir.display());
    let summary = sgen_codegen::generate(config)?;

    match &summary.deployment {
        None => {
            println!("Dry run mode - would generate:");
            for path in &summary.files {
                println!("  {}", path.display());
            }
        }
        Some(report) => {
            for orphan in &report.orphans {
                let state = if report.removed.contains(orphan) {
                    "removed"
                } else {
                    "kept"
                };
                println!("Orphan ({}): {}", state, orphan.display());
            }
            info!(
                "Code generation completed successfully: {} entities",
                summary.entities
            );
        }
    }
    Ok(())
}

fn inject(config: &GeneratorConfig, request: PatchRequest) -> Result<()> {
    if config.dry_run {
        println!(
            "Dry run mode - would inject into {} at lines matching `{}`",
            request.path.display(),
            request.pattern
        );
        return Ok(());
    }

    let report = sgen_codegen::inject(config, &request)?;
    println!(
        "Injected into {} after line(s) {:?}",
        request.path.display(),
        report.positions
    );
    Ok(())
}

fn inspect_declarations(config: &GeneratorConfig) -> Result<()> {
    let (collection, errors) =
        sgen_codegen::parser::parse_dir(&config.data_dir, &config.models_module)?;

    println!("Parsed {} entities:\n", collection.entities.len());
    for entity in &collection.entities {
        println!("Entity: {} ({})", entity.name, entity.source_file.display());
        if let Some(comment) = &entity.comment {
            println!("  Comment: {}", comment);
        }
        println!("  Fields:");
        for field in &entity.fields {
            let mut flags = Vec::new();
            if field.is_primary_key {
                flags.push("PRIMARY KEY");
            }
            if field.skip {
                flags.push("SKIP");
            }
            println!(
                "    - {}: {} -> {} {}",
                field.name,
                field.ty,
                field.column,
                flags.join(" ")
            );
        }
        println!();
    }

    for error in sgen_codegen::validator::validate(&collection)
        .iter()
        .chain(errors.iter())
    {
        println!("Problem: {}", error);
    }

    Ok(())
}

fn show_ledger(config: &GeneratorConfig) -> Result<()> {
    let store = TomlLedgerStore::new(&config.register_file);
    let register = ArtifactRegister::load(&store)?;
    let ledger = register.baseline();

    if ledger.is_empty() {
        println!("No ledger at {}", store.path().display());
        return Ok(());
    }

    for (owner, entry) in ledger.entries() {
        println!("{} ({})", owner, entry.package);
        for path in &entry.paths {
            println!("  {}", path.display());
        }
    }
    Ok(())
}
