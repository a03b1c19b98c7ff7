use super::parse_id;
use crate::error::CatalogError;
use crate::services::{html, views};
use crate::state::AppState;
use actix_web::{web, Responder, ResponseError};

/// Handler for `GET /editar/{id}`.
pub(crate) async fn process(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    match render_edit(&state, &id).await {
        Ok(page) => html(page),
        Err(e) => e.error_response(),
    }
}

async fn render_edit(state: &AppState, raw_id: &str) -> Result<String, CatalogError> {
    let id = parse_id(raw_id)?;
    let course = state
        .with_store(move |store| store.find(&id))
        .await?
        .ok_or(CatalogError::NotFound)?;
    Ok(views::edit_page(&course))
}
