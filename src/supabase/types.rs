//! Shared types used by the table client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the hosted database.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Supabase URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The database rejected the request.
    #[error("Database request failed ({status}): {message}")]
    Api {
        /// HTTP status returned by the REST gateway.
        status: StatusCode,
        /// Error message reported by the database, or the raw body.
        message: String,
    },
    /// Response body was not the expected JSON rows.
    #[error("Failed to decode database response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body shape emitted by PostgREST (`code`, `details`, and `hint` are ignored).
#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) message: String,
}
