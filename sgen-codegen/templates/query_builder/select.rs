use super::{equalities, owned, Dialect};

/// `SELECT` over one table
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    count: bool,
    filters: Vec<String>,
    limit: Option<u64>,
}

impl Select {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            count: false,
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = owned(columns);
        self
    }

    /// Select `COUNT(*)` instead of columns
    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Add an equality condition on `column`
    pub fn filter(mut self, column: &str) -> Self {
        self.filters.push(column.to_string());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self, dialect: Dialect) -> String {
        let projection = if self.count {
            "COUNT(*)".to_string()
        } else if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| dialect.quote(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projection, dialect.quote(&self.table));
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&equalities(dialect, &self.filters, 1, " AND "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}
