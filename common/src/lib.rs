//! Data model shared by the course catalog service.
//!
//! `model::course` holds the records as the store sees them and
//! `model::backup` holds the portable shape written to the JSON backup file.

pub mod model;
