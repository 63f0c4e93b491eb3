//! API route handlers.
//!
//! Each handler returns either a `Json` payload or an `ApiError`, which the
//! error boundary converts to the uniform envelope.

pub mod chat;
pub mod health;
pub mod system;
pub mod upload;
