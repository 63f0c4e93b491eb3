//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware chain, dispatch)
//!     → api / ws / web handlers
//!     → response.rs (uniform envelope)
//!     → error.rs (handler errors → envelope at one boundary)
//!     → Send to client
//! ```

pub mod error;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use response::ApiResponse;
pub use server::{AppState, HttpServer};
