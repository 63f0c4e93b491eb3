//! Health check and docs-redirect endpoints.

use axum::Json;
use serde::Serialize;

use crate::http::response::iso_timestamp;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: iso_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/docs-redirect`
pub async fn docs_redirect() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Visit /api/docs for API documentation"
    }))
}
