use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A backup entry carries an `_id` that is not a course identifier.
    #[error("Malformed identifier {value:?} in backup entry {index}")]
    MalformedIdentifier { index: usize, value: String },

    /// The backup file is missing, unreadable or not a JSON array of courses.
    #[error("Could not read backup {}: {reason}", .path.display())]
    BackupRead { path: PathBuf, reason: String },

    /// The store refused the restored batch (duplicate id or any other insert failure).
    #[error("Restore rejected by the store: {0}")]
    RestoreRejected(String),

    #[error("Could not export the catalog: {0}")]
    Export(String),

    #[error("Missing publish credentials (GITHUB_USER / GITHUB_TOKEN)")]
    MissingCredentials,

    #[error("Publish failed")]
    PublishFailed { transcript: String },

    #[error("{0} is not a valid course id")]
    InvalidId(String),

    #[error("Course not found")]
    NotFound,

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::MalformedIdentifier { .. } | CatalogError::InvalidForm(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::InvalidId(_) | CatalogError::Upload(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound => StatusCode::NOT_FOUND,
            CatalogError::Store(_) | CatalogError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/html; charset=utf-8")
            .body(crate::services::views::error_page(&self.to_string()))
    }
}
