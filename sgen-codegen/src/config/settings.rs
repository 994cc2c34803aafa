//! Configuration settings for sgen-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{CodegenError, Result};

/// SQL dialect the database driver template is selected by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[serde(alias = "MySQL")]
    Mysql,
    #[serde(alias = "PostgreSQL", alias = "postgres")]
    Postgresql,
    /// Any other value; module staging copies no driver for it
    #[serde(other)]
    Unrecognized,
}

impl SqlDialect {
    /// Parse a dialect name, falling back to `Unrecognized`
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "mysql" => Self::Mysql,
            "postgresql" | "postgres" => Self::Postgresql,
            _ => Self::Unrecognized,
        }
    }

    /// File name of the driver template under `<template_dir>/general`
    pub fn driver_template(&self) -> Option<&'static str> {
        match self {
            Self::Mysql => Some("mysql.rs.tmpl"),
            Self::Postgresql => Some("postgresql.rs.tmpl"),
            Self::Unrecognized => None,
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
            Self::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Main configuration struct for a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory containing the struct declarations
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Output base directory of the generated database layer
    #[serde(default = "default_database_dir")]
    pub database_dir: PathBuf,

    /// Directory containing the query builder tree and driver templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// SQL dialect (mysql, postgresql)
    #[serde(default = "default_sql_dialect")]
    pub sql_dialect: SqlDialect,

    /// Remove files whose owner disappeared since the previous run
    #[serde(default = "default_auto_delete")]
    pub auto_delete: bool,

    /// Ownership ledger location
    #[serde(default = "default_register_file")]
    pub register_file: PathBuf,

    /// Module path of the declarations (e.g. `models` for `crate::models`)
    #[serde(default = "default_models_module")]
    pub models_module: String,

    /// Module path of the generated database layer
    #[serde(default = "default_database_module")]
    pub database_module: String,

    /// Run the formatter over written files
    #[serde(default = "default_format_generated")]
    pub format_generated: bool,

    /// Formatter binary
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}
fn default_database_dir() -> PathBuf {
    PathBuf::from(defaults::DATABASE_DIR)
}
fn default_template_dir() -> PathBuf {
    PathBuf::from(defaults::TEMPLATE_DIR)
}
fn default_sql_dialect() -> SqlDialect {
    SqlDialect::from_name(defaults::SQL_DIALECT)
}
fn default_auto_delete() -> bool {
    defaults::AUTO_DELETE
}
fn default_register_file() -> PathBuf {
    PathBuf::from(defaults::REGISTER_FILE)
}
fn default_models_module() -> String {
    defaults::MODELS_MODULE.to_string()
}
fn default_database_module() -> String {
    defaults::DATABASE_MODULE.to_string()
}
fn default_format_generated() -> bool {
    defaults::FORMAT_GENERATED
}
fn default_formatter() -> String {
    defaults::FORMATTER.to_string()
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_dir: default_database_dir(),
            template_dir: default_template_dir(),
            sql_dialect: default_sql_dialect(),
            auto_delete: default_auto_delete(),
            register_file: default_register_file(),
            models_module: default_models_module(),
            database_module: default_database_module(),
            format_generated: default_format_generated(),
            formatter: default_formatter(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a default config reading declarations from `data_dir`
    pub fn default_with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodegenError::file(path, e))?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder =
                builder.add_source(File::with_name(defaults::CONFIG_FILE).required(false));
        }

        // Override with environment variables (SGEN_*)
        builder = builder
            .add_source(Environment::with_prefix(defaults::ENV_PREFIX).try_parsing(true));

        let config: GeneratorConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError("data_dir is required".into()));
        }

        if !self.data_dir.is_dir() {
            return Err(CodegenError::ValidationError(format!(
                "Declaration directory not found: {}",
                self.data_dir.display()
            )));
        }

        if !self.template_dir.is_dir() {
            return Err(CodegenError::ValidationError(format!(
                "Template directory not found: {}",
                self.template_dir.display()
            )));
        }

        if self.database_dir.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "database_dir is required".into(),
            ));
        }

        if self.models_module.is_empty() {
            return Err(CodegenError::ValidationError(
                "models_module is required".into(),
            ));
        }

        if self.format_generated && self.formatter.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "formatter is required when format_generated is true".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.sql_dialect, SqlDialect::Mysql);
        assert!(!config.auto_delete);
        assert!(config.format_generated);
        assert_eq!(config.formatter, "rustfmt");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validation_missing_data_dir() {
        let config =
            GeneratorConfig::default_with_data_dir(PathBuf::from("/nonexistent/models"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_ok() {
        let data = tempfile::tempdir().unwrap();
        let templates = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            template_dir: templates.path().to_path_buf(),
            ..GeneratorConfig::default_with_data_dir(data.path().to_path_buf())
        };
        assert!(config.validate().is_ok());

        let config = GeneratorConfig {
            formatter: "  ".into(),
            ..config
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            data_dir = "src/models"
            sql_dialect = "postgresql"
            auto_delete = true
            log_level = "debug"
        "#;
        let config: GeneratorConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.sql_dialect, SqlDialect::Postgresql);
        assert!(config.auto_delete);
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.register_file, PathBuf::from(defaults::REGISTER_FILE));
    }

    #[test]
    fn test_unknown_dialect_is_unrecognized() {
        let config: GeneratorConfig = toml::from_str(r#"sql_dialect = "sqlite""#).unwrap();
        assert_eq!(config.sql_dialect, SqlDialect::Unrecognized);
        assert!(config.sql_dialect.driver_template().is_none());

        assert_eq!(SqlDialect::from_name("MySQL"), SqlDialect::Mysql);
        assert_eq!(SqlDialect::from_name("postgres"), SqlDialect::Postgresql);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sgen.toml");
        std::fs::write(&path, "database_dir = \"out/db\"\nformat_generated = false\n").unwrap();

        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.database_dir, PathBuf::from("out/db"));
        assert!(!config.format_generated);
    }
}
