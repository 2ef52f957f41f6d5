#![deny(missing_docs)]

//! Core library for the student API server.

/// HTTP routing, handlers, and the JSON response envelope.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Student records, validation, and the service backing the HTTP surface.
pub mod students;
/// Hosted Postgres (PostgREST) table client.
pub mod supabase;
