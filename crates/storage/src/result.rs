//! Query result rows

use std::collections::HashMap;

#[cfg(test)]
#[path = "result_test.rs"]
mod tests;

/// One row of a query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, serde_json::Value>,
}

impl Row {
    /// Create a row from its column map
    pub fn new(columns: HashMap<String, serde_json::Value>) -> Self {
        Self { columns }
    }

    /// Look up a column value
    pub fn column(&self, name: &str) -> Option<&serde_json::Value> {
        self.columns.get(name)
    }

    /// Look up a column as a string
    pub fn column_str(&self, name: &str) -> Option<&str> {
        self.columns.get(name).and_then(|v| v.as_str())
    }

    /// Look up a column as an integer
    pub fn column_i64(&self, name: &str) -> Option<i64> {
        self.columns.get(name).and_then(|v| v.as_i64())
    }

    /// Borrow the full column map
    pub fn columns(&self) -> &HashMap<String, serde_json::Value> {
        &self.columns
    }
}

/// Result of a table query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create a result set from rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows returned
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the result is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Access the rows
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// First row, if any
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}
