//! Reads the multipart course form and stores the optional image upload.

use crate::error::CatalogError;
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use log::{info, warn};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use std::time::{SystemTime, UNIX_EPOCH};

/// The text fields of the course form plus the stored image name, if one was sent.
#[derive(Debug, Default)]
pub struct CourseForm {
    pub title: String,
    pub duration: String,
    pub price: String,
    pub image: Option<String>,
}

/// Name under which an upload is stored: `{unix_seconds}_{sanitized client name}`.
pub fn stored_file_name(client_name: &str, unix_seconds: u64) -> Result<String, CatalogError> {
    let unsafe_chars = Regex::new(r"[^A-Za-z0-9._-]")
        .map_err(|e| CatalogError::Upload(format!("Regex error: {}", e)))?;
    let base = client_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned = unsafe_chars.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    let name = if cleaned.is_empty() { "imagen" } else { cleaned };
    Ok(format!("{}_{}", unix_seconds, name))
}

async fn read_text(field: &mut Field) -> Result<String, CatalogError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        bytes.extend_from_slice(&chunk.map_err(|e| CatalogError::Upload(e.to_string()))?);
    }
    String::from_utf8(bytes).map_err(|_| CatalogError::InvalidForm("text is not valid UTF-8".into()))
}

async fn drain(field: &mut Field) -> Result<(), CatalogError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| CatalogError::Upload(e.to_string()))?;
    }
    Ok(())
}

/// Writes the upload to a hidden temp file in the uploads directory.
///
/// The temp file is deleted on drop, so a form rejected later leaves nothing behind.
async fn stage_image(field: &mut Field, uploads_dir: &Path) -> Result<NamedTempFile, CatalogError> {
    let io_err = |e: std::io::Error| {
        CatalogError::Upload(format!("cannot write to {}: {}", uploads_dir.display(), e))
    };
    let mut staged = NamedTempFile::new_in(uploads_dir).map_err(io_err)?;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| CatalogError::Upload(e.to_string()))?;
        staged.write_all(&chunk).map_err(io_err)?;
    }
    staged.flush().map_err(io_err)?;
    Ok(staged)
}

fn persist_image(staged: NamedTempFile, uploads_dir: &Path, client_name: &str) -> Result<String, CatalogError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let stored = stored_file_name(client_name, now)?;
    let path = uploads_dir.join(&stored);
    staged
        .persist(&path)
        .map_err(|e| CatalogError::Upload(format!("cannot write {}: {}", path.display(), e.error)))?;
    info!("Stored upload {}", stored);
    Ok(stored)
}

/// Removes an upload whose course could not be saved.
pub fn discard_upload(uploads_dir: &Path, name: &str) {
    let path = uploads_dir.join(name);
    match fs::remove_file(&path) {
        Ok(()) => info!("Discarded upload {}", name),
        Err(e) => warn!("Could not remove upload {}: {}", path.display(), e),
    }
}

/// Parses `titulo`, `duracion`, `precio` and the optional `imagen` file.
///
/// The three text fields are required and must not be blank. A file part with
/// an empty file name (no file chosen in the browser) counts as no image. The
/// image is only moved to its final name once the whole form is valid.
pub async fn read_course_form(mut payload: Multipart, uploads_dir: &Path) -> Result<CourseForm, CatalogError> {
    let mut form = CourseForm::default();
    let mut seen = [false; 3];
    let mut staged: Option<(NamedTempFile, String)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| CatalogError::Upload(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("titulo") => {
                form.title = read_text(&mut field).await?;
                seen[0] = true;
            }
            Some("duracion") => {
                form.duration = read_text(&mut field).await?;
                seen[1] = true;
            }
            Some("precio") => {
                form.price = read_text(&mut field).await?;
                seen[2] = true;
            }
            Some("imagen") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if filename.trim().is_empty() {
                    drain(&mut field).await?;
                } else {
                    staged = Some((stage_image(&mut field, uploads_dir).await?, filename));
                }
            }
            _ => drain(&mut field).await?,
        }
    }

    for (present, (label, value)) in seen.iter().zip([
        ("titulo", &form.title),
        ("duracion", &form.duration),
        ("precio", &form.price),
    ]) {
        if !present || value.trim().is_empty() {
            return Err(CatalogError::InvalidForm(format!("'{}' is required", label)));
        }
    }
    if let Some((file, client_name)) = staged {
        form.image = Some(persist_image(file, uploads_dir, &client_name)?);
    }
    Ok(form)
}
