//! Server-rendered HTML for the catalog.
//!
//! Pages are plain strings around a Bootstrap layout. Anything that came from a
//! user (course fields, file names, git output) goes through `escape` first.

use common::model::course::Course;

const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/400x250/e9ecef/adb5bd?text=Sin+Imagen";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn layout(content: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang='es'><head><meta charset='UTF-8'>\
         <meta name='viewport' content='width=device-width, initial-scale=1'><title>Cursos</title>\
         <link href='https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css' rel='stylesheet'>\
         <style>@import url('https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;600;700&display=swap');\
         body{{font-family:'Poppins',sans-serif;background-color:#f8f9fa}}</style></head><body>\
         <nav class='navbar navbar-expand-lg navbar-dark bg-dark py-3 shadow-sm'><div class='container'>\
         <a class='navbar-brand fw-bold fs-4' href='/'>📷 Cursos online</a>\
         <form action='/subir-git' method='POST' class='d-flex m-0'>\
         <button class='btn btn-outline-light fw-bold'>☁️ Push Git</button></form></div></nav>\
         {content}</body></html>"
    )
}

/// The create/edit form. `course` prefills the fields when editing.
pub fn course_form(action: &str, button: &str, course: Option<&Course>) -> String {
    let (title, duration, price) = course
        .map(|c| (escape(&c.title), escape(&c.duration), escape(&c.price)))
        .unwrap_or_default();
    format!(
        "<form action='{action}' method='POST' enctype='multipart/form-data'>\
         <div class='mb-3'><label class='fw-bold'>Título</label>\
         <input type='text' name='titulo' value='{title}' class='form-control' required></div>\
         <div class='row'><div class='col-6 mb-3'><label class='fw-bold'>Duración</label>\
         <input type='text' name='duracion' value='{duration}' class='form-control' required></div>\
         <div class='col-6 mb-3'><label class='fw-bold'>Precio</label>\
         <input type='text' name='precio' value='{price}' class='form-control' required></div></div>\
         <div class='mb-3 bg-white p-2 border rounded'><label class='fw-bold'>Imagen</label>\
         <input type='file' name='imagen' class='form-control' accept='image/*'></div>\
         <button class='btn btn-primary w-100 fw-bold'>{button}</button></form>",
        action = escape(action),
        button = escape(button),
    )
}

fn course_card(course: &Course) -> String {
    let id = course.id.to_string();
    let image = match &course.image {
        Some(name) => format!("/uploads/{}", escape(name)),
        None => PLACEHOLDER_IMAGE.to_string(),
    };
    format!(
        "<div class='col-md-4 mb-4'><div class='card h-100 shadow-sm border-0'>\
         <img src='{image}' class='card-img-top rounded-top' style='height: 220px; object-fit: cover; background-color: #f0f0f0;'>\
         <div class='card-body'><h5 class='card-title fw-bold text-dark'>{title}</h5><div class='mb-2'>\
         <span class='badge bg-light text-dark border'>⏱️ {duration}</span> \
         <span class='badge bg-success bg-opacity-75'>🏷️ {price}</span></div></div>\
         <div class='card-footer bg-white border-top-0 d-flex justify-content-between py-3'>\
         <a href='/editar/{id}' class='btn btn-outline-primary btn-sm fw-bold px-3'>✏️ Editar</a>\
         <form action='/borrar/{id}' method='POST' style='margin:0;' onsubmit=\"return confirm('¿Borrar curso?');\">\
         <button type='submit' class='btn btn-outline-danger btn-sm px-3'>🗑️ Borrar</button></form>\
         </div></div></div>",
        title = escape(&course.title),
        duration = escape(&course.duration),
        price = escape(&course.price),
    )
}

pub fn catalog_page(courses: &[Course]) -> String {
    let cards: String = courses.iter().map(course_card).collect();
    layout(&format!(
        "<div class='p-5 mb-5 bg-dark text-white rounded-3 shadow-sm' style='background: linear-gradient(135deg, #1e3c72 0%, #2a5298 100%);'>\
         <div class='container-fluid py-2 text-center text-md-start'>\
         <h1 class='display-4 fw-bold'>Mis Cursos Online</h1>\
         <p class='fs-5 col-md-8'>Catálogo gestionado con Rust, SQLite y Git.</p>\
         <a href='#form-crear' class='btn btn-light text-primary fw-bold btn-lg mt-3 shadow-sm'>+ Subir Nuevo Curso</a>\
         </div></div>\
         <div class='container'><div class='row'>{cards}</div></div>\
         <div class='container mt-5 mb-5' id='form-crear' style='max-width: 700px;'>\
         <div class='card shadow-lg border-0'>\
         <div class='card-header bg-primary text-white py-3 fw-bold'>➕ Añadir Nuevo Curso</div>\
         <div class='card-body p-4'>{form}</div></div></div>",
        form = course_form("/nuevo", "Guardar Curso", None),
    ))
}

pub fn edit_page(course: &Course) -> String {
    layout(&format!(
        "<div class='container mt-5' style='max-width:600px'><div class='card p-4'>{}</div></div>",
        course_form(&format!("/actualizar/{}", course.id), "Actualizar", Some(course))
    ))
}

pub fn publish_success_page() -> String {
    layout(
        "<div class='text-center mt-5 pt-5'><div style='font-size: 80px;'>✅</div>\
         <h1 class='text-success fw-bold'>Subida Correcta</h1>\
         <p class='lead'>Datos guardados y subidos a GitHub.</p>\
         <a href='/' class='btn btn-primary mt-3'>Volver</a></div>",
    )
}

/// `transcript` must already be redacted.
pub fn publish_error_page(transcript: &str) -> String {
    layout(&format!(
        "<div class='container mt-5 alert alert-danger shadow-sm'><h4>❌ Error</h4>\
         <pre>{}</pre><a href='/' class='btn btn-outline-danger'>Volver</a></div>",
        escape(transcript)
    ))
}

pub fn missing_credentials_page() -> String {
    layout(
        "<div class='container mt-5 alert alert-danger'>❌ Error: Faltan credenciales \
         (GITHUB_USER / GITHUB_TOKEN). El backup se ha guardado pero no se ha subido.\
         <br><a href='/' class='btn btn-outline-danger mt-3'>Volver</a></div>",
    )
}

pub fn error_page(message: &str) -> String {
    layout(&format!(
        "<div class='container mt-5 alert alert-danger'>{}<br>\
         <a href='/' class='btn btn-outline-danger mt-3'>Volver</a></div>",
        escape(message)
    ))
}
