pub mod courses;
pub mod publish;
pub mod uploads;
pub mod views;

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::HttpResponse;

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// Post/redirect/get back to the catalog.
pub(crate) fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther().insert_header((LOCATION, "/")).finish()
}
