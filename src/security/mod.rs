//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (security headers, CORS, preflight)
//!     → rate_limit.rs (check per-IP window)
//!     → Pass to dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: a client over its window is rejected before dispatch
//! - Headers are set on every response, including rejections
//! - No trust in client input

pub mod headers;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
