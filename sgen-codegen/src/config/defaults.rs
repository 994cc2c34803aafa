//! Default configuration values - single source of truth

/// Default directory holding the struct declarations
pub const DATA_DIR: &str = "./src/models";

/// Default output base directory for the generated database layer
pub const DATABASE_DIR: &str = "./src/database";

/// Default directory holding the query builder and driver templates: the
/// ones shipped with this crate
pub const TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Default SQL dialect
pub const SQL_DIALECT: &str = "mysql";

/// Whether orphaned files are removed by default
pub const AUTO_DELETE: bool = false;

/// Default location of the ownership ledger
pub const REGISTER_FILE: &str = "./sgen-register.toml";

/// Default module path of the declarations, relative to the crate root
pub const MODELS_MODULE: &str = "models";

/// Default module path of the generated database layer, relative to the crate root
pub const DATABASE_MODULE: &str = "database";

/// Whether generated files are run through the formatter by default
pub const FORMAT_GENERATED: bool = true;

/// Default formatter binary
pub const FORMATTER: &str = "rustfmt";

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Default config file name searched for by `GeneratorConfig::load`
pub const CONFIG_FILE: &str = "sgen";

/// Prefix of the environment variables overriding the config
pub const ENV_PREFIX: &str = "SGEN";
