use super::{owned, Dialect};

/// `INSERT` of one row
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
}

impl Insert {
    pub fn into(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = owned(columns);
        self
    }

    pub fn build(self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| dialect.quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote(&self.table),
            columns,
            placeholders
        )
    }
}
