//! # Catalog Backup
//!
//! The backup file is a pretty-printed JSON array of `BackupRecord`s kept at the
//! project root, so it can be read by hand and diffed in version control.
//!
//! - `codec`: translates between stored courses (native ids) and backup entries
//!   (text ids), and between entries and JSON text.
//! - `reconcile`: the one-time startup check that refills an empty store from
//!   the backup file.

pub mod codec;
pub mod reconcile;
