use super::CourseStore;
use crate::error::CatalogError;
use common::model::course::{Course, CourseDraft, CourseId, CourseUpdate};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS courses (
    id BLOB NOT NULL PRIMARY KEY,
    titulo TEXT NOT NULL,
    duracion TEXT NOT NULL,
    precio TEXT NOT NULL,
    imagen TEXT
)";

/// `CourseStore` backed by a single SQLite database.
///
/// Ids are kept as 12-byte blobs; `rowid` preserves insertion order for listing.
/// After `close` every operation fails with `StoreUnavailable`.
pub struct SqliteCourseStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteCourseStore {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        info!("Opened course store at {}", path.display());
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CatalogError> {
        conn.execute(SCHEMA, [])?;
        Ok(SqliteCourseStore {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Flushes and closes the underlying connection. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), CatalogError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CatalogError::StoreUnavailable("connection lock poisoned".into()))?
            .take();
        match conn {
            Some(conn) => conn.close().map_err(|(_, e)| CatalogError::Store(e)),
            None => Ok(()),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| CatalogError::StoreUnavailable("connection lock poisoned".into()))?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| CatalogError::StoreUnavailable("store is closed".into()))?;
        f(conn)
    }
}

fn read_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    let raw: Vec<u8> = row.get(0)?;
    let bytes: [u8; 12] = raw.as_slice().try_into().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Blob,
            format!("course id has {} bytes, expected 12", raw.len()).into(),
        )
    })?;
    Ok(Course {
        id: CourseId::from_bytes(bytes),
        title: row.get(1)?,
        duration: row.get(2)?,
        price: row.get(3)?,
        image: row.get(4)?,
    })
}

fn insert_draft(conn: &Connection, draft: &CourseDraft) -> Result<CourseId, CatalogError> {
    let id = draft.id.unwrap_or_else(CourseId::generate);
    conn.execute(
        "INSERT INTO courses (id, titulo, duracion, precio, imagen) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &id.as_bytes()[..],
            &draft.title,
            &draft.duration,
            &draft.price,
            &draft.image
        ],
    )?;
    Ok(id)
}

impl CourseStore for SqliteCourseStore {
    fn count(&self) -> Result<u64, CatalogError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn list(&self) -> Result<Vec<Course>, CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, titulo, duracion, precio, imagen FROM courses ORDER BY rowid",
            )?;
            let courses = stmt
                .query_map([], read_course)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(courses)
        })
    }

    fn find(&self, id: &CourseId) -> Result<Option<Course>, CatalogError> {
        self.with_conn(|conn| {
            let course = conn
                .query_row(
                    "SELECT id, titulo, duracion, precio, imagen FROM courses WHERE id = ?1",
                    params![&id.as_bytes()[..]],
                    read_course,
                )
                .optional()?;
            Ok(course)
        })
    }

    fn insert_one(&self, draft: CourseDraft) -> Result<CourseId, CatalogError> {
        self.with_conn(|conn| insert_draft(conn, &draft))
    }

    fn insert_many(&self, drafts: Vec<CourseDraft>) -> Result<Vec<CourseId>, CatalogError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut ids = Vec::with_capacity(drafts.len());
            for draft in &drafts {
                // Dropping `tx` on error rolls the whole batch back.
                ids.push(insert_draft(&tx, draft)?);
            }
            tx.commit()?;
            Ok(ids)
        })
    }

    fn update_fields(&self, id: &CourseId, update: CourseUpdate) -> Result<bool, CatalogError> {
        self.with_conn(|conn| {
            let changed = match &update.image {
                Some(image) => conn.execute(
                    "UPDATE courses SET titulo = ?1, duracion = ?2, precio = ?3, imagen = ?4 WHERE id = ?5",
                    params![
                        &update.title,
                        &update.duration,
                        &update.price,
                        image,
                        &id.as_bytes()[..]
                    ],
                )?,
                None => conn.execute(
                    "UPDATE courses SET titulo = ?1, duracion = ?2, precio = ?3 WHERE id = ?4",
                    params![&update.title, &update.duration, &update.price, &id.as_bytes()[..]],
                )?,
            };
            Ok(changed > 0)
        })
    }

    fn delete(&self, id: &CourseId) -> Result<bool, CatalogError> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM courses WHERE id = ?1",
                params![&id.as_bytes()[..]],
            )?;
            Ok(removed > 0)
        })
    }
}
