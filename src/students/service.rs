//! Student service issuing table operations against the hosted database.

use crate::{
    students::types::{NewStudent, Student, StudentError},
    supabase::{EqFilter, SupabaseService},
};
use async_trait::async_trait;

/// Abstraction over student storage used by the HTTP surface.
#[async_trait]
pub trait StudentsApi: Send + Sync {
    /// Return every stored student in the order the database yields them.
    async fn list_students(&self) -> Result<Vec<Student>, StudentError>;

    /// Insert a student and return the stored row, including its assigned `id`.
    async fn create_student(&self, student: NewStudent) -> Result<Student, StudentError>;

    /// Delete the student with `id`, returning the row as it was before deletion.
    async fn delete_student(&self, id: i64) -> Result<Student, StudentError>;
}

/// [`StudentsApi`] implementation backed by a single database table.
///
/// Construct once at startup and share through an `Arc`.
pub struct StudentService {
    store: SupabaseService,
    table: String,
}

impl StudentService {
    /// Wrap `store`, reading and writing rows of `table`.
    pub fn new(store: SupabaseService, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl StudentsApi for StudentService {
    async fn list_students(&self) -> Result<Vec<Student>, StudentError> {
        Ok(self.store.select_all(&self.table).await?)
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, StudentError> {
        let rows: Vec<Student> = self.store.insert(&self.table, &student).await?;
        rows.into_iter().next().ok_or(StudentError::EmptyInsert)
    }

    // The lookup and the delete are separate statements; a concurrent delete between them
    // still reports success with the looked-up row.
    async fn delete_student(&self, id: i64) -> Result<Student, StudentError> {
        let filter = EqFilter::new("id", id);
        let existing: Vec<Student> = self.store.select_eq(&self.table, &filter).await?;
        let Some(record) = existing.into_iter().next() else {
            return Err(StudentError::NotFound(id));
        };

        let _removed: Vec<serde_json::Value> = self.store.delete_eq(&self.table, &filter).await?;
        tracing::debug!(table = %self.table, id, "Deleted student row");
        Ok(record)
    }
}
