//! Statement builder shared by the generated storages
//!
//! Statements are assembled from column names only; values always travel as
//! bound parameters.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

/// SQL flavour a statement is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Backtick identifiers, `?` parameters
    MySql,
    /// Double-quoted identifiers, `$1`.. parameters
    Postgres,
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character
    pub fn quote(self, identifier: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            Dialect::Postgres => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }

    /// Placeholder of the 1-based parameter `index`
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::MySql => "?".to_string(),
            Dialect::Postgres => format!("${}", index),
        }
    }
}

/// `a = ?<sep>b = ?` for `columns`, numbering parameters from `first`
fn equalities(dialect: Dialect, columns: &[String], first: usize, separator: &str) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", dialect.quote(c), dialect.placeholder(first + i)))
        .collect::<Vec<_>>()
        .join(separator)
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}
