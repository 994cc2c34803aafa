use super::{equalities, Dialect};

/// `DELETE` of the rows matching every filter
#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    filters: Vec<String>,
}

impl Delete {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, column: &str) -> Self {
        self.filters.push(column.to_string());
        self
    }

    pub fn build(self, dialect: Dialect) -> String {
        let mut sql = format!("DELETE FROM {}", dialect.quote(&self.table));
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&equalities(dialect, &self.filters, 1, " AND "));
        }
        sql
    }
}
