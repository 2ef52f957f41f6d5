//! Hosted Postgres integration over its PostgREST interface.

pub mod client;
pub mod filters;
pub mod types;

pub use client::SupabaseService;
pub use filters::EqFilter;
pub use types::SupabaseError;
