pub mod backup;
pub mod course;
