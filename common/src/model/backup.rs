use serde::{Deserialize, Serialize};

/// One entry of the JSON backup file.
///
/// The keys match the files written by earlier versions of the catalog, so old
/// backups stay loadable. `_id` is plain text to keep the file independent of the
/// store; an entry without `_id` is restored as a new course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "duracion")]
    pub duration: String,
    #[serde(rename = "precio")]
    pub price: String,
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}
