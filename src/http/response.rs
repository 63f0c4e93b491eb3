//! Uniform API response envelope.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Envelope wrapping every API reply: success flag, optional payload,
/// optional human-readable message, and a server timestamp.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful reply carrying a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: iso_timestamp(),
        }
    }

    /// Successful reply carrying a payload and a message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            timestamp: iso_timestamp(),
        }
    }
}

impl ApiResponse<()> {
    /// Failed reply carrying only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            timestamp: iso_timestamp(),
        }
    }
}

/// Current time as an ISO8601 string, used for all API timestamps.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
