//! `POST /subir-git`: exports the catalog and pushes the project to the remote.
//!
//! The page shows either the success banner, a missing-credentials notice, or
//! the redacted transcript of the failed push.

use crate::error::CatalogError;
use crate::services::views;
use crate::state::AppState;
use actix_web::http::header::ContentType;
use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Responder, ResponseError, Scope};
use log::info;

const API_PATH: &str = "/subir-git";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(process))
}

pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    let result = match state.publisher.publish().await {
        Ok(result) => result,
        Err(e) => return e.error_response(),
    };
    info!("Publish finished, success={}", result.success);
    match result.into_result() {
        Ok(_) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(views::publish_success_page()),
        Err(CatalogError::MissingCredentials) => HttpResponse::ServiceUnavailable()
            .content_type(ContentType::html())
            .body(views::missing_credentials_page()),
        Err(CatalogError::PublishFailed { transcript }) => HttpResponse::BadGateway()
            .content_type(ContentType::html())
            .body(views::publish_error_page(&transcript)),
        Err(e) => e.error_response(),
    }
}
