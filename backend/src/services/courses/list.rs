use crate::error::CatalogError;
use crate::services::{html, views};
use crate::state::AppState;
use actix_web::{web, Responder, ResponseError};

/// Handler for `GET /`: renders the whole catalog.
pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    match render_catalog(&state).await {
        Ok(page) => html(page),
        Err(e) => e.error_response(),
    }
}

async fn render_catalog(state: &AppState) -> Result<String, CatalogError> {
    let courses = state.with_store(|store| store.list()).await?;
    Ok(views::catalog_page(&courses))
}

