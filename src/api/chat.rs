//! Chat message endpoints.
//!
//! There is no message store: `GET` generates a fixed synthetic page and
//! `POST` enriches the incoming message and broadcasts it to every
//! registered WebSocket connection.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::response::{iso_timestamp, ApiResponse};
use crate::http::server::AppState;

/// Total synthetic messages available regardless of limit.
const SYNTHETIC_MESSAGE_COUNT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub user: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Incoming message body. A body without `content` fails deserialization
/// and surfaces as a 400 envelope.
#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub content: String,
    pub user: Option<String>,
}

/// `GET /api/chat/messages?limit&offset`
pub async fn list_messages(Query(query): Query<ListQuery>) -> Json<ApiResponse<Vec<ChatMessage>>> {
    Json(ApiResponse::ok(synthetic_page(query.offset, query.limit)))
}

fn synthetic_page(offset: usize, limit: usize) -> Vec<ChatMessage> {
    let end = offset.saturating_add(limit).min(SYNTHETIC_MESSAGE_COUNT);
    (offset..end)
        .map(|i| ChatMessage {
            id: format!("msg_{i}"),
            content: format!("Sample message {i}"),
            user: "system".to_string(),
            timestamp: iso_timestamp(),
        })
        .collect()
}

/// `POST /api/chat/messages`
///
/// Assigns an id and timestamp, fans the message out to all WebSocket
/// connections, and returns the enriched message.
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Client(e.body_text()))?;

    let message = ChatMessage {
        id: format!("msg_{}", Utc::now().timestamp()),
        content: payload.content,
        user: payload.user.unwrap_or_else(|| "anonymous".to_string()),
        timestamp: iso_timestamp(),
    };

    match serde_json::to_string(&message) {
        Ok(json) => {
            let delivered = state.registry.broadcast(&json);
            tracing::debug!(delivered, message_id = %message.id, "Broadcast chat message");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize chat message");
        }
    }

    Ok(Json(ApiResponse::ok_with_message(
        message,
        "Message created successfully",
    )))
}
