//! File upload endpoint.

use std::path::Path;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    Json,
};
use serde::Serialize;
use tokio::fs;

use crate::http::error::ApiError;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub filename: String,
    pub size: usize,
}

/// `POST /api/upload`
///
/// Accepts a single multipart `file` field and writes it into the uploads
/// directory under its original filename. An existing file with the same
/// name is overwritten.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<UploadReceipt>>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Client(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Client(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| ApiError::Client("Invalid filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Client(e.body_text()))?;

        let dir = &state.config.uploads.dir;
        fs::create_dir_all(dir).await?;
        fs::write(dir.join(&filename), &data).await?;

        tracing::info!(filename = %filename, size = data.len(), "File uploaded");

        return Ok(Json(ApiResponse::ok_with_message(
            UploadReceipt {
                filename,
                size: data.len(),
            },
            "File uploaded successfully",
        )));
    }

    Err(ApiError::Client("No file provided".to_string()))
}
