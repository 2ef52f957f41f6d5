//! Student records, create-body validation, and the service the HTTP surface calls into.

mod service;
pub mod types;

pub use service::{StudentService, StudentsApi};
pub use types::{NewStudent, Student, StudentError};
