//! Static file serving with SPA fallback.
//!
//! Any unmatched GET outside `/api/` first attempts a literal file lookup
//! under the static root, then falls back to the index page. Unmatched
//! `/api/` paths (and unmatched non-GET methods) get the JSON 404 envelope.

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tokio::fs;

use crate::config::schema::StaticConfig;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Page served when no index file exists on disk.
const DEFAULT_INDEX: &str = include_str!("../../assets/index.html");

/// Router fallback for everything without an explicit route.
pub async fn spa_fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path();

    if path.starts_with("/api/") || method != Method::GET {
        return ApiError::NotFound.into_response();
    }

    if let Some(file) = resolve_path(&state.config.static_files.root, path) {
        if let Ok(content) = fs::read(&file).await {
            return file_response(&file, content);
        }
    }

    serve_index(&state.config.static_files).await
}

/// Map a request path to a file under the static root.
///
/// Returns None for the bare root and for paths trying to climb out of it.
fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let candidate = Path::new(relative);
    let traversal = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if traversal {
        return None;
    }

    Some(root.join(candidate))
}

async fn serve_index(config: &StaticConfig) -> Response {
    let index_path = config.root.join(&config.index);
    let content = match fs::read_to_string(&index_path).await {
        Ok(content) => content,
        Err(_) => DEFAULT_INDEX.to_string(),
    };

    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/html"))],
        content,
    )
        .into_response()
}

fn file_response(path: &Path, content: Vec<u8>) -> Response {
    let content_type = content_type_for(path);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        content,
    )
        .into_response()
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
