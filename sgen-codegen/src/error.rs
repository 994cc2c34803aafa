//! Error types for sgen-codegen

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sgen-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse declarations: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error at {}: {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Pattern `{pattern}` matched nothing in {}", path.display())]
    NoMatchError { path: PathBuf, pattern: String },

    #[error("Ledger persistence error: {0}")]
    PersistenceError(String),

    #[error("Formatter failed: {0}")]
    FormatWarning(String),

    #[error("{0}")]
    Generation(GenerationErrors),
}

impl CodegenError {
    /// Attach the offending path to an IO error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::FileError {
            path: path.into(),
            source,
        }
    }
}

impl From<syn::Error> for CodegenError {
    fn from(err: syn::Error) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}

impl From<GenerationErrors> for CodegenError {
    fn from(errors: GenerationErrors) -> Self {
        CodegenError::Generation(errors)
    }
}

/// Pipeline stage an error is reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parsing,
    Validating,
    Templating,
    Reconciliation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Validating => "validating",
            Self::Templating => "templating",
            Self::Reconciliation => "reconciliation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors of one generation run, grouped by the stage that produced them.
///
/// Stages keep every error pushed to them so a single run reports all of its
/// problems at once.
#[derive(Debug, Default)]
pub struct GenerationErrors {
    sections: BTreeMap<Stage, Vec<CodegenError>>,
}

impl GenerationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a stage
    pub fn push(&mut self, stage: Stage, error: CodegenError) {
        self.sections.entry(stage).or_default().push(error);
    }

    /// Record several errors against a stage
    pub fn extend(&mut self, stage: Stage, errors: impl IntoIterator<Item = CodegenError>) {
        for error in errors {
            self.push(stage, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of errors across all stages
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Errors recorded against a stage
    pub fn get(&self, stage: Stage) -> &[CodegenError] {
        self.sections.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, stage: Stage) -> bool {
        self.sections.contains_key(&stage)
    }

    /// `Ok(())` when nothing was recorded, the aggregate otherwise
    pub fn into_result(self) -> std::result::Result<(), GenerationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for GenerationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (stage, errors) in &self.sections {
            writeln!(f, "{} section of generating:", stage)?;
            for error in errors {
                writeln!(f, "\t{}", error)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for GenerationErrors {}
