use crate::error::CatalogError;
use crate::services::redirect_home;
use crate::services::uploads::{discard_upload, read_course_form};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, Responder, ResponseError};
use common::model::course::{CourseDraft, CourseId};
use log::info;

/// Handler for `POST /nuevo`.
pub(crate) async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match create_course(&state, payload).await {
        Ok(_) => redirect_home(),
        Err(e) => e.error_response(),
    }
}

async fn create_course(state: &AppState, payload: Multipart) -> Result<CourseId, CatalogError> {
    let form = read_course_form(payload, &state.uploads_dir).await?;
    let image = form.image.clone();
    let draft = CourseDraft::new(form.title, form.duration, form.price, form.image);
    let inserted = state.with_store(move |store| store.insert_one(draft)).await;
    if let (Err(_), Some(name)) = (&inserted, &image) {
        discard_upload(&state.uploads_dir, name);
    }
    let id = inserted?;
    info!("Created course {}", id);
    Ok(id)
}
