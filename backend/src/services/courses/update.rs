use super::parse_id;
use crate::error::CatalogError;
use crate::services::redirect_home;
use crate::services::uploads::{discard_upload, read_course_form};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, Responder, ResponseError};
use common::model::course::CourseUpdate;
use log::info;

/// Handler for `POST /actualizar/{id}`.
pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    match update_course(&state, &id, payload).await {
        Ok(()) => redirect_home(),
        Err(e) => e.error_response(),
    }
}

async fn update_course(state: &AppState, raw_id: &str, payload: Multipart) -> Result<(), CatalogError> {
    let id = parse_id(raw_id)?;
    let form = read_course_form(payload, &state.uploads_dir).await?;
    let image = form.image.clone();
    let update = CourseUpdate {
        title: form.title,
        duration: form.duration,
        price: form.price,
        image: form.image,
    };
    let updated = state
        .with_store(move |store| store.update_fields(&id, update))
        .await
        .and_then(|matched| if matched { Ok(()) } else { Err(CatalogError::NotFound) });
    if let (Err(_), Some(name)) = (&updated, &image) {
        discard_upload(&state.uploads_dir, name);
    }
    updated?;
    info!("Updated course {}", id);
    Ok(())
}
