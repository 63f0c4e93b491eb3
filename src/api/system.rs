//! System status endpoint.

use axum::{extract::State, Json};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::status::{self, SystemStatus};

/// `GET /api/system/status`
///
/// Returns a complete snapshot or a 500 envelope; never a partial response.
pub async fn get_system_status(
    State(state): State<AppState>,
) -> Result<Json<SystemStatus>, ApiError> {
    let snapshot = status::collect(state.started_at).await?;
    Ok(Json(snapshot))
}
