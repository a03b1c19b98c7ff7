//! # Course Services
//!
//! The catalog pages and the create/update/delete endpoints.
//!
//! ## Registered Routes:
//!
//! *   **`GET /`** (`list::process`): the catalog with one card per course and the
//!     create form.
//! *   **`POST /nuevo`** (`create::process`): multipart form with `titulo`,
//!     `duracion`, `precio` and an optional `imagen` file. Redirects to `/`.
//! *   **`GET /editar/{id}`** (`edit::process`): the edit form, prefilled.
//! *   **`POST /actualizar/{id}`** (`update::process`): same form as create; the
//!     stored image only changes when a new file is sent. Redirects to `/`.
//! *   **`POST /borrar/{id}`** (`delete::process`): removes the course. Redirects to `/`.
//!
//! A malformed `{id}` answers `400`, an unknown one `404`.

mod create;
mod delete;
mod edit;
mod list;
mod update;

use crate::error::CatalogError;
use actix_web::web::{self, get, post};
use common::model::course::CourseId;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", get().to(list::process))
        .route("/nuevo", post().to(create::process))
        .route("/editar/{id}", get().to(edit::process))
        .route("/actualizar/{id}", post().to(update::process))
        .route("/borrar/{id}", post().to(delete::process));
}

fn parse_id(raw: &str) -> Result<CourseId, CatalogError> {
    raw.parse()
        .map_err(|_| CatalogError::InvalidId(raw.to_string()))
}
