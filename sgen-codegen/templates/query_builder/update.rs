use super::{equalities, owned, Dialect};

/// `UPDATE` of the rows matching every filter
///
/// Parameters are numbered through the `SET` list first, then the filters.
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    columns: Vec<String>,
    filters: Vec<String>,
}

impl Update {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn set(mut self, columns: &[&str]) -> Self {
        self.columns = owned(columns);
        self
    }

    pub fn filter(mut self, column: &str) -> Self {
        self.filters.push(column.to_string());
        self
    }

    pub fn build(self, dialect: Dialect) -> String {
        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote(&self.table),
            equalities(dialect, &self.columns, 1, ", ")
        );
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&equalities(
                dialect,
                &self.filters,
                self.columns.len() + 1,
                " AND ",
            ));
        }
        sql
    }
}
