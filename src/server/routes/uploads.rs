//! Multipart file uploads
//!
//! Files land flat in the configured upload directory and are served back
//! under `/uploads/<name>`.

use crate::auth::AuthUser;
use crate::config::UploadConfig;
use crate::server::routes::ok;
use crate::server::state::AppState;
use crate::utils::crypto::random_digits;
use crate::utils::error::{AppError, Result};
use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::StreamExt;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

const INVALID_TYPE: &str = "Invalid file type. Only images and documents are allowed.";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/upload")
            .route("", web::post().to(upload_single))
            .route("/multiple", web::post().to(upload_multiple)),
    );
}

/// What the client gets back for each stored file
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Lowercase extension including the dot, or empty
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Both the extension and the declared mime type must name an allowed kind
fn accepts(config: &UploadConfig, extension: &str, mime: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    let mime = mime.to_lowercase();
    let ext_ok = config.allowed_extensions.iter().any(|a| a == extension);
    let mime_ok = config
        .allowed_extensions
        .iter()
        .any(|a| mime.contains(a.as_str()));
    ext_ok && mime_ok
}

/// `<field>-<millis>-<9 random digits><ext>`
fn stored_name(field: &str, extension: &str) -> String {
    format!(
        "{}-{}-{}{}",
        field,
        Utc::now().timestamp_millis(),
        random_digits(9),
        extension
    )
}

/// A validated file held in memory until the whole request has been read
struct PendingFile {
    stored_name: String,
    original: String,
    mime_type: String,
    data: Vec<u8>,
}

/// Validate and buffer one multipart file field
async fn read_field(config: &UploadConfig, field_name: &str, mut field: Field) -> Result<PendingFile> {
    let original = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or_default()
        .to_string();
    let mime_type = field
        .content_type()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    let extension = extension_of(&original);

    if !accepts(config, &extension, &mime_type) {
        return Err(AppError::bad_request(INVALID_TYPE));
    }

    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| AppError::bad_request(format!("Error reading file: {}", e)))?;
        if data.len() + bytes.len() > config.max_file_size {
            return Err(AppError::bad_request(format!(
                "File too large. Maximum size is {} bytes",
                config.max_file_size
            )));
        }
        data.extend_from_slice(&bytes);
    }

    Ok(PendingFile {
        stored_name: stored_name(field_name, &extension),
        original,
        mime_type,
        data,
    })
}

/// Read every field named `wanted`, skipping the rest; nothing is written
/// unless every wanted field passes validation
async fn collect(
    state: &AppState,
    mut payload: Multipart,
    wanted: &str,
    limit: usize,
) -> Result<Vec<UploadedFile>> {
    let config = state.config.uploads();
    let mut pending = Vec::new();
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::bad_request(format!("Invalid multipart data: {}", e)))?;
        if field.name() != Some(wanted) {
            debug!("Skipping multipart field {:?}", field.name());
            while field.next().await.is_some() {}
            continue;
        }
        if pending.len() == limit {
            return Err(AppError::bad_request(format!(
                "Too many files. Maximum is {}",
                limit
            )));
        }
        pending.push(read_field(config, wanted, field).await?);
    }
    persist(state, pending).await
}

/// Write buffered files, removing the ones already written if any write fails
async fn persist(state: &AppState, pending: Vec<PendingFile>) -> Result<Vec<UploadedFile>> {
    let files = &state.storage.files;
    let mut stored: Vec<UploadedFile> = Vec::with_capacity(pending.len());
    let mut written: Vec<String> = Vec::with_capacity(pending.len());

    for file in pending {
        if let Err(e) = files.store(&file.stored_name, &file.data).await {
            for name in &written {
                if let Err(cleanup) = files.remove(name).await {
                    warn!("Failed to remove partial upload {}: {}", name, cleanup);
                }
            }
            return Err(e);
        }
        info!("Stored upload {} ({} bytes)", file.stored_name, file.data.len());

        stored.push(UploadedFile {
            url: format!("/uploads/{}", file.stored_name),
            name: file.original,
            size: file.data.len(),
            mime_type: file.mime_type,
        });
        written.push(file.stored_name);
    }
    Ok(stored)
}

/// `POST /api/upload` with field `file`
async fn upload_single(
    state: web::Data<AppState>,
    _user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let file = collect(&state, payload, "file", 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;
    Ok(ok(file))
}

/// `POST /api/upload/multiple` with repeated field `files`
async fn upload_multiple(
    state: web::Data<AppState>,
    _user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let limit = state.config.uploads().max_files;
    let files = collect(&state, payload, "files", limit).await?;
    if files.is_empty() {
        return Err(AppError::bad_request("No files uploaded"));
    }
    Ok(ok(files))
}
