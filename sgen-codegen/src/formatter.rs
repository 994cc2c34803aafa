//! Best-effort source formatting of written files

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{CodegenError, Result};

/// Post-processing hook run over files after they are written
pub trait SourceFormatter {
    /// Format a file, or every source file directly inside a directory
    fn format(&self, path: &Path) -> Result<()>;
}

/// Runs an external formatter binary (`rustfmt` by default)
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn rustfmt() -> Self {
        Self::new("rustfmt")
    }

    fn targets(path: &Path) -> Result<Vec<PathBuf>> {
        if !path.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| CodegenError::file(path, e))? {
            let entry = entry.map_err(|e| CodegenError::file(path, e))?;
            let file = entry.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == "rs") {
                files.push(file);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::rustfmt()
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, path: &Path) -> Result<()> {
        let targets = Self::targets(path)?;
        if targets.is_empty() {
            return Ok(());
        }

        debug!("Running {} on {}", self.program, path.display());
        let status = Command::new(&self.program)
            .args(&targets)
            .status()
            .map_err(|e| {
                CodegenError::FormatWarning(format!("{} can't be called: {}", self.program, e))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CodegenError::FormatWarning(format!(
                "{} exited with {} on {}",
                self.program,
                status,
                path.display()
            )))
        }
    }
}

/// Formatter that leaves files untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl SourceFormatter for NoopFormatter {
    fn format(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Run the formatter, logging a failure instead of returning it
pub fn format_best_effort(formatter: &dyn SourceFormatter, path: &Path) -> bool {
    match formatter.format(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Skipping formatting of {}: {}", path.display(), e);
            false
        }
    }
}
