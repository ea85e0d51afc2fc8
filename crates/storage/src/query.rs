//! Structured query payloads
//!
//! The core talks to storage in structured documents, not SQL. A
//! [`Query`] carries an optional [`Where`] clause, an [`InsertValues`]
//! is an ordered column/literal list, and an [`UpdateBatch`] is a list
//! of `(expressions, where)` pairs applied as one logical batch.
//!
//! All payload types serialize to JSON; concrete backends translate
//! the JSON document into their own dialect.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;

/// Comparison condition for a where clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
}

/// Single-column where clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Where {
    column: String,
    condition: Condition,
    value: serde_json::Value,
}

impl Where {
    /// Create a where clause
    pub fn new(
        column: impl Into<String>,
        condition: Condition,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            column: column.into(),
            condition,
            value: value.into(),
        }
    }

    /// Shorthand for the common `column = value` clause
    pub fn equals(column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(column, Condition::Equals, value)
    }

    /// Column the clause applies to
    #[inline]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Comparison condition
    #[inline]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Literal compared against
    #[inline]
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Evaluate the clause against one row column value
    ///
    /// Missing columns never match. Ordering conditions only apply to
    /// numbers; mismatched types never match.
    pub fn matches(&self, column_value: Option<&serde_json::Value>) -> bool {
        let Some(actual) = column_value else {
            return false;
        };
        match self.condition {
            Condition::Equals => actual == &self.value,
            Condition::NotEquals => actual != &self.value,
            Condition::GreaterThan => match (actual.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            Condition::LessThan => match (actual.as_f64(), self.value.as_f64()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
        }
    }
}

/// Table query: an optional where clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "where")]
    where_clause: Option<Where>,
}

impl Query {
    /// Query rows matching a where clause
    pub fn new(where_clause: Where) -> Self {
        Self {
            where_clause: Some(where_clause),
        }
    }

    /// Query every row in the table
    pub fn all() -> Self {
        Self { where_clause: None }
    }

    /// The where clause, if any
    #[inline]
    pub fn where_clause(&self) -> Option<&Where> {
        self.where_clause.as_ref()
    }

    /// Encode the query as a JSON document
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Ordered list of `(column, literal)` pairs for an insert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertValues {
    values: Vec<(String, serde_json::Value)>,
}

impl InsertValues {
    /// Create an empty value list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.push((column.into(), value.into()));
    }

    /// Builder-style append
    pub fn with(mut self, column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Iterate over the column/value pairs
    pub fn iter(&self) -> std::slice::Iter<'_, (String, serde_json::Value)> {
        self.values.iter()
    }

    /// Number of columns
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether any values are present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a column value by name
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Encode the values as a JSON document
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> =
            self.values.iter().cloned().collect();
        serde_json::Value::Object(map)
    }
}

/// Arithmetic operator in an update expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
}

/// One `column = column <op> operand` update expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    column: String,
    operator: Operator,
    operand: i64,
}

impl Expression {
    /// Create an expression
    pub fn new(column: impl Into<String>, operator: Operator, operand: i64) -> Self {
        Self {
            column: column.into(),
            operator,
            operand,
        }
    }

    /// Shorthand for `column = column + operand`
    pub fn add(column: impl Into<String>, operand: i64) -> Self {
        Self::new(column, Operator::Add, operand)
    }

    /// Column being updated
    #[inline]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Apply the expression to a current column value
    ///
    /// A missing or non-numeric current value is treated as zero.
    pub fn apply(&self, current: Option<&serde_json::Value>) -> serde_json::Value {
        let base = current.and_then(|v| v.as_i64()).unwrap_or(0);
        let next = match self.operator {
            Operator::Add => base.saturating_add(self.operand),
            Operator::Subtract => base.saturating_sub(self.operand),
        };
        serde_json::Value::from(next)
    }
}

/// Expressions applied together to the rows matched by one where clause
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionValues {
    expressions: Vec<Expression>,
}

impl ExpressionValues {
    /// Create an empty expression list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression
    pub fn push(&mut self, expression: Expression) {
        self.expressions.push(expression);
    }

    /// Builder-style append
    pub fn with(mut self, expression: Expression) -> Self {
        self.push(expression);
        self
    }

    /// Iterate over the expressions
    pub fn iter(&self) -> std::slice::Iter<'_, Expression> {
        self.expressions.iter()
    }

    /// Check whether any expressions are present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Batched update: `(expressions, where)` pairs applied as one call
///
/// The batch is one logical storage operation; partial application on
/// failure is a backend concern the core never observes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatch {
    updates: Vec<(ExpressionValues, Where)>,
}

impl UpdateBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one update to the batch
    pub fn push(&mut self, expressions: ExpressionValues, where_clause: Where) {
        self.updates.push((expressions, where_clause));
    }

    /// Iterate over the batched updates
    pub fn iter(&self) -> std::slice::Iter<'_, (ExpressionValues, Where)> {
        self.updates.iter()
    }

    /// Number of updates in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Check whether the batch is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
