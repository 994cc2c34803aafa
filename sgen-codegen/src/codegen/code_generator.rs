//! Renderer seam between parsed declarations and deployment

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::parser::Collection;

/// A rendered file, written as-is by the deployer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Entity (or package) the file is recorded against
    pub owner: String,
    /// Directory relative to the output base
    pub directory: PathBuf,
    pub file_name: String,
    pub source: String,
}

impl GeneratedFile {
    pub fn new(
        owner: impl Into<String>,
        directory: impl Into<PathBuf>,
        file_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            directory: directory.into(),
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    /// Path relative to the output base
    pub fn relative_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Path under `base`
    pub fn path_in(&self, base: &Path) -> PathBuf {
        base.join(self.relative_path())
    }
}

/// Turns parsed declarations into files
pub trait Renderer {
    fn render(&self, collection: &Collection) -> Result<Vec<GeneratedFile>>;
}
