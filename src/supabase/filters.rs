//! Row filters rendered as PostgREST query parameters.

use std::fmt::Display;

/// Equality constraint on a single column (`column=eq.value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    column: String,
    value: String,
}

impl EqFilter {
    /// Match rows whose `column` equals `value`.
    pub fn new(column: impl Into<String>, value: impl Display) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Render the filter as a query-string pair.
    pub fn to_query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}
