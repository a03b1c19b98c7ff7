//! Startup auto-restore.
//!
//! Runs once in `main.rs`, after the store is opened and before the HTTP server
//! binds. An empty store with a backup file next to it gets refilled from that
//! file; a store holding anything at all is never touched.

use crate::backup::codec;
use crate::error::CatalogError;
use crate::store::CourseStore;
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The store already had this many courses.
    StoreNotEmpty(u64),
    NoBackupFile,
    /// The backup file held an empty array.
    EmptyBackup,
    /// This many courses were restored.
    Restored(usize),
}

pub struct StartupReconciler {
    store: Arc<dyn CourseStore>,
    backup_path: PathBuf,
}

impl StartupReconciler {
    pub fn new(store: Arc<dyn CourseStore>, backup_path: PathBuf) -> Self {
        StartupReconciler { store, backup_path }
    }

    /// Restores the backup when, and only when, the store is empty.
    ///
    /// The batch is decoded completely before anything is inserted and is then
    /// inserted atomically, so a failure leaves the store empty.
    pub fn run(&self) -> Result<ReconcileOutcome, CatalogError> {
        let count = self.store.count()?;
        if count > 0 {
            return Ok(ReconcileOutcome::StoreNotEmpty(count));
        }
        if !self.backup_path.exists() {
            return Ok(ReconcileOutcome::NoBackupFile);
        }

        warn!("Empty course store detected, restoring from {}", self.backup_path.display());

        let text = fs::read_to_string(&self.backup_path).map_err(|e| self.read_error(e))?;
        let entries = codec::from_json(&text).map_err(|e| self.read_error(e))?;
        let drafts = codec::decode(entries)?;
        if drafts.is_empty() {
            return Ok(ReconcileOutcome::EmptyBackup);
        }

        let restored = self
            .store
            .insert_many(drafts)
            .map_err(|e| CatalogError::RestoreRejected(e.to_string()))?;
        Ok(ReconcileOutcome::Restored(restored.len()))
    }

    /// `run` for process startup: failures are logged and the service starts anyway.
    pub fn run_at_startup(&self) -> Option<ReconcileOutcome> {
        match self.run() {
            Ok(outcome) => {
                match &outcome {
                    ReconcileOutcome::Restored(n) => {
                        info!("Restore complete: loaded {} courses from the backup", n)
                    }
                    ReconcileOutcome::StoreNotEmpty(n) => {
                        info!("Course store holds {} courses, skipping restore", n)
                    }
                    ReconcileOutcome::NoBackupFile => info!("No backup file, starting empty"),
                    ReconcileOutcome::EmptyBackup => info!("Backup file is empty, nothing to restore"),
                }
                Some(outcome)
            }
            Err(e) => {
                error!("Auto-restore failed: {}", e);
                None
            }
        }
    }

    fn read_error(&self, e: impl std::fmt::Display) -> CatalogError {
        CatalogError::BackupRead {
            path: self.backup_path.clone(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteCourseStore;
    use common::model::course::{CourseDraft, CourseId};
    use tempfile::TempDir;

    fn setup(backup: Option<&str>) -> (TempDir, Arc<SqliteCourseStore>, StartupReconciler) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup_cursos.json");
        if let Some(text) = backup {
            fs::write(&path, text).unwrap();
        }
        let store = Arc::new(SqliteCourseStore::open_in_memory().unwrap());
        let reconciler = StartupReconciler::new(store.clone(), path);
        (dir, store, reconciler)
    }

    fn entry(id: &str, title: &str) -> String {
        format!(
            r#"{{"_id":"{}","titulo":"{}","duracion":"2h","precio":"9","imagen":null}}"#,
            id, title
        )
    }

    #[test]
    fn restores_two_entries_with_their_ids() {
        let (a, b) = (CourseId::generate(), CourseId::generate());
        let json = format!("[{},{}]", entry(&a.to_string(), "Uno"), entry(&b.to_string(), "Dos"));
        let (_dir, store, reconciler) = setup(Some(&json));

        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::Restored(2));
        assert_eq!(store.count().unwrap(), 2);
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn never_touches_a_non_empty_store() {
        let json = format!("[{}]", entry(&CourseId::generate().to_string(), "Backup"));
        let (_dir, store, reconciler) = setup(Some(&json));
        let existing = store
            .insert_one(CourseDraft::new("Vivo".into(), "1h".into(), "1".into(), None))
            .unwrap();

        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::StoreNotEmpty(1));
        let courses = store.list().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, existing);
    }

    #[test]
    fn restores_backups_written_by_the_mongodb_catalog() {
        let json = r#"[
  {
    "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
    "titulo": "Docker",
    "duracion": "5h",
    "precio": "15€",
    "imagen": "1705000000_docker.png"
  },
  {
    "_id": "65a1f0c2e4b0a1b2c3d4e5f7",
    "titulo": "Ruby",
    "duracion": "8h",
    "precio": "20€",
    "imagen": null
  }
]"#;
        let (_dir, store, reconciler) = setup(Some(json));

        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::Restored(2));
        let ids: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["65a1f0c2e4b0a1b2c3d4e5f6", "65a1f0c2e4b0a1b2c3d4e5f7"]);
        let id: CourseId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(
            store.find(&id).unwrap().unwrap().image.as_deref(),
            Some("1705000000_docker.png")
        );
    }

    #[test]
    fn non_empty_store_ignores_broken_backups() {
        let malformed = format!("[{}]", entry("no-es-un-id", "Malo"));
        for backup in ["{ not json", "", malformed.as_str()] {
            let (_dir, store, reconciler) = setup(Some(backup));
            let existing = store
                .insert_one(CourseDraft::new("Vivo".into(), "1h".into(), "1".into(), None))
                .unwrap();

            assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::StoreNotEmpty(1));
            let courses = store.list().unwrap();
            assert_eq!(courses.len(), 1);
            assert_eq!(courses[0].id, existing);
            assert_eq!(courses[0].title, "Vivo");
        }
    }

    #[test]
    fn missing_file_is_a_no_op() {
        let (_dir, store, reconciler) = setup(None);
        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::NoBackupFile);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn one_malformed_id_restores_nothing() {
        let json = format!(
            "[{},{},{}]",
            entry(&CourseId::generate().to_string(), "Bueno"),
            entry("no-es-un-id", "Malo"),
            entry(&CourseId::generate().to_string(), "Otro"),
        );
        let (_dir, store, reconciler) = setup(Some(&json));

        assert!(matches!(
            reconciler.run(),
            Err(CatalogError::MalformedIdentifier { index: 1, .. })
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn invalid_json_is_a_read_error_and_startup_survives() {
        let (_dir, store, reconciler) = setup(Some("{ not json"));
        assert!(matches!(reconciler.run(), Err(CatalogError::BackupRead { .. })));
        assert_eq!(reconciler.run_at_startup(), None);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn duplicate_ids_abort_the_restore() {
        let id = CourseId::generate().to_string();
        let json = format!("[{},{}]", entry(&id, "Uno"), entry(&id, "Dos"));
        let (_dir, store, reconciler) = setup(Some(&json));

        assert!(matches!(reconciler.run(), Err(CatalogError::RestoreRejected(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn empty_array_restores_nothing() {
        let (_dir, store, reconciler) = setup(Some("[]"));
        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::EmptyBackup);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn entries_without_id_get_fresh_ones() {
        let json = r#"[{"titulo":"Sin id","duracion":"1h","precio":"5","imagen":"a.png"}]"#;
        let (_dir, store, reconciler) = setup(Some(json));
        assert_eq!(reconciler.run().unwrap(), ReconcileOutcome::Restored(1));
        let course = &store.list().unwrap()[0];
        assert_eq!(course.title, "Sin id");
        assert_eq!(course.image.as_deref(), Some("a.png"));
    }
}
