//! Handler error taxonomy.
//!
//! Every handler-level failure is converted to the uniform JSON envelope at
//! this single `IntoResponse` boundary. Internal detail (probe and I/O errors)
//! is logged but never exposed to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::response::ApiResponse;
use crate::status::ProbeError;

/// Errors that can occur while serving an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing client input (bad JSON body, absent upload field).
    #[error("{0}")]
    Client(String),

    /// No route matched an API path.
    #[error("Endpoint not found")]
    NotFound,

    /// Client exceeded its request window.
    #[error("{0}")]
    RateLimited(String),

    /// The OS metrics provider could not produce a full snapshot.
    #[error("system metrics unavailable")]
    Probe(#[from] ProbeError),

    /// Filesystem failure (upload write, static read).
    #[error("i/o failure")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Client(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Probe(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose in the response body.
    fn public_message(&self) -> String {
        match self {
            ApiError::Probe(_) | ApiError::Io(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Probe(e) => {
                tracing::error!(error = %e, "System status probe failed");
            }
            ApiError::Io(e) => {
                tracing::error!(error = %e, "I/O failure while handling request");
            }
            _ => {}
        }

        // The 429 body predates the envelope: {"error": <message>}.
        if let ApiError::RateLimited(message) = &self {
            let body = serde_json::json!({ "error": message });
            return (status, Json(body)).into_response();
        }

        let body = ApiResponse::error(self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Client("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::RateLimited("slow down".into()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Probe(ProbeError::Unavailable("memory")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::Probe(ProbeError::Unavailable("disk"));
        assert_eq!(err.public_message(), "Internal server error");
    }
}
