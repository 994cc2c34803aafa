//! Regex-anchored snippet injection into existing source files

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::error::{CodegenError, Result};
use crate::files::write_atomic;
use crate::formatter::{format_best_effort, SourceFormatter};

/// Where a snippet lands relative to the lines matching the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Prefix the matched content in place, on the same line.
    ///
    /// The snippet lands at the start of the first match, not at the start of
    /// the line; the two only coincide for `^`-anchored patterns.
    WholeFile,
    /// Insert the snippet as a new line after every matching line
    Declaration,
}

/// One injection into one file
#[derive(Debug, Clone)]
pub struct PatchRequest {
    pub path: PathBuf,
    pub pattern: String,
    pub snippet: String,
    pub scope: Scope,
}

impl PatchRequest {
    pub fn new(
        path: impl Into<PathBuf>,
        pattern: impl Into<String>,
        snippet: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            path: path.into(),
            pattern: pattern.into(),
            snippet: snippet.into(),
            scope,
        }
    }
}

/// Outcome of a successful injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// 1-based numbers of the lines that matched, in file order
    pub positions: Vec<usize>,
    /// Whether the formatter ran cleanly afterwards
    pub formatted: bool,
}

/// Text produced by [`patch_text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    pub positions: Vec<usize>,
}

/// Split on `\n`; the terminator is not kept. An empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// 1-based numbers of the lines matching `pattern`
pub fn match_positions(lines: &[&str], pattern: &Regex) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| pattern.is_match(line))
        .map(|(i, _)| i + 1)
        .collect()
}

/// Rewrite `text` with `snippet` placed according to `scope`.
///
/// For [`Scope::Declaration`] the 1-based match position of line `i` doubles as
/// the 0-based index the snippet is emitted in front of; a position equal to
/// the line count appends the snippet as the new last line.
pub fn patch_text(text: &str, pattern: &Regex, snippet: &str, scope: Scope) -> Patched {
    let lines = split_lines(text);
    let positions = match_positions(&lines, pattern);

    let rebuilt: Vec<String> = match scope {
        Scope::WholeFile => lines
            .iter()
            .map(|line| match pattern.find(line) {
                Some(m) => {
                    let (head, tail) = line.split_at(m.start());
                    format!("{}{}{}", head, snippet, tail)
                }
                None => line.to_string(),
            })
            .collect(),
        Scope::Declaration => {
            let insert_before: BTreeSet<usize> = positions.iter().copied().collect();
            let mut out = Vec::with_capacity(lines.len() + positions.len());
            for (k, line) in lines.iter().enumerate() {
                if insert_before.contains(&k) {
                    out.push(snippet.to_string());
                }
                out.push(line.to_string());
            }
            if insert_before.contains(&lines.len()) {
                out.push(snippet.to_string());
            }
            out
        }
    };

    Patched {
        text: rebuilt.join("\n"),
        positions,
    }
}

/// Splices snippets into files next to regex-identified anchor lines
pub struct LinePatcher<'a> {
    formatter: &'a dyn SourceFormatter,
}

impl<'a> LinePatcher<'a> {
    pub fn new(formatter: &'a dyn SourceFormatter) -> Self {
        Self { formatter }
    }

    /// Inject `snippet` into the file at `path`
    pub fn inject(
        &self,
        path: &Path,
        pattern: &str,
        snippet: &str,
        scope: Scope,
    ) -> Result<PatchReport> {
        let pattern = Regex::new(pattern)?;
        let original = std::fs::read_to_string(path).map_err(|e| CodegenError::file(path, e))?;

        let patched = patch_text(&original, &pattern, snippet, scope);
        debug!(
            "{} line(s) of {} match `{}`",
            patched.positions.len(),
            path.display(),
            pattern
        );

        if scope == Scope::Declaration && patched.positions.is_empty() {
            return Err(CodegenError::NoMatchError {
                path: path.to_path_buf(),
                pattern: pattern.as_str().to_string(),
            });
        }

        write_atomic(path, &patched.text)?;
        info!(
            "Patched {} at {} position(s)",
            path.display(),
            patched.positions.len()
        );

        let formatted = format_best_effort(self.formatter, path);
        Ok(PatchReport {
            positions: patched.positions,
            formatted,
        })
    }

    /// Apply a prepared request
    pub fn apply(&self, request: &PatchRequest) -> Result<PatchReport> {
        self.inject(
            &request.path,
            &request.pattern,
            &request.snippet,
            request.scope,
        )
    }
}
