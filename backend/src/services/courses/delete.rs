use super::parse_id;
use crate::error::CatalogError;
use crate::services::redirect_home;
use crate::state::AppState;
use actix_web::{web, Responder, ResponseError};
use log::info;

/// Handler for `POST /borrar/{id}`. The course's uploaded image stays on disk.
pub(crate) async fn process(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    match delete_course(&state, &id).await {
        Ok(()) => redirect_home(),
        Err(e) => e.error_response(),
    }
}

async fn delete_course(state: &AppState, raw_id: &str) -> Result<(), CatalogError> {
    let id = parse_id(raw_id)?;
    if !state.with_store(move |store| store.delete(&id)).await? {
        return Err(CatalogError::NotFound);
    }
    info!("Deleted course {}", id);
    Ok(())
}
