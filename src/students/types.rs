//! Student data types and the error taxonomy shared by the service and HTTP layer.

use crate::supabase::SupabaseError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while validating or executing a student operation.
///
/// The `Display` text of each variant is exactly what API callers see in the `error` field.
#[derive(Debug, Error)]
pub enum StudentError {
    /// Body was absent, not a JSON object, or lacked `name`/`age`.
    #[error("Name and age are required")]
    MissingFields,
    /// `name` was not a string or `age` was not an integer.
    #[error("Name must be a string and age must be an integer")]
    InvalidTypes,
    /// No row matched the requested identifier.
    #[error("Student with ID {0} not found")]
    NotFound(i64),
    /// Insert succeeded but the database returned no representation of the new row.
    #[error("Database returned no row for the inserted student")]
    EmptyInsert,
    /// Database interaction failed; the raw error text is surfaced to callers.
    #[error(transparent)]
    Store(#[from] SupabaseError),
}

/// Student row as returned by the database.
///
/// The row is kept as the key-value record the database produced, so a null or unexpected
/// column never stops a listing or a delete. `id`, `name`, and `age` are read on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Student(Map<String, Value>);

impl Student {
    /// Wrap a raw database record.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Database-assigned identifier, when present and integral.
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    /// Student name, when present and a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Student age, when present and integral.
    pub fn age(&self) -> Option<i64> {
        self.0.get("age").and_then(Value::as_i64)
    }

    /// Every column of the row.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Validated payload for inserting a student; never carries an `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    /// Student name.
    pub name: String,
    /// Student age.
    pub age: i64,
}

impl NewStudent {
    /// Validate a raw request body.
    ///
    /// Checks run in order and the first failure wins: the body must be a JSON object holding
    /// both `name` and `age`, then `name` must be a string and `age` an integer. JSON booleans
    /// and floating-point numbers (even `20.0`) are not integers. Other keys are ignored.
    pub fn from_body(body: &[u8]) -> Result<Self, StudentError> {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Err(StudentError::MissingFields);
        };
        let (Some(name), Some(age)) = (fields.get("name"), fields.get("age")) else {
            return Err(StudentError::MissingFields);
        };
        match (name.as_str(), age.as_i64()) {
            (Some(name), Some(age)) => Ok(Self {
                name: name.to_string(),
                age,
            }),
            _ => Err(StudentError::InvalidTypes),
        }
    }
}
