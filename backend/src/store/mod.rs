//! # Course Store
//!
//! The catalog only ever talks to its storage through the `CourseStore` trait:
//! count, list, find, insert (one or a batch), update fields and delete. The
//! handle is created once in `main.rs`, shared as `Arc<dyn CourseStore>`, and
//! handed to the startup reconciler, the publish workflow and the HTTP handlers.
//!
//! `SqliteCourseStore` is the production implementation.

mod sqlite;

pub use sqlite::SqliteCourseStore;

use crate::error::CatalogError;
use common::model::course::{Course, CourseDraft, CourseId, CourseUpdate};

pub trait CourseStore: Send + Sync {
    fn count(&self) -> Result<u64, CatalogError>;

    /// All courses in insertion order.
    fn list(&self) -> Result<Vec<Course>, CatalogError>;

    fn find(&self, id: &CourseId) -> Result<Option<Course>, CatalogError>;

    /// Inserts one course, generating an id when the draft has none.
    fn insert_one(&self, draft: CourseDraft) -> Result<CourseId, CatalogError>;

    /// Inserts every draft in order, or none of them if any insert fails.
    fn insert_many(&self, drafts: Vec<CourseDraft>) -> Result<Vec<CourseId>, CatalogError>;

    /// Returns `false` when no course has that id.
    fn update_fields(&self, id: &CourseId, update: CourseUpdate) -> Result<bool, CatalogError>;

    /// Returns `false` when no course has that id.
    fn delete(&self, id: &CourseId) -> Result<bool, CatalogError>;
}
