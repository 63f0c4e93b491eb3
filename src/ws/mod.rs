//! WebSocket subsystem.
//!
//! # Data Flow
//! ```text
//! GET /ws upgrade
//!     → handler.rs (register, split socket, spawn pusher + recv tasks)
//!     → registry.rs (broadcast frames to every registered sender)
//!     → handler.rs (unregister on disconnect)
//! ```
//!
//! # Design Decisions
//! - One unbounded channel per connection; sends never block the broadcaster
//! - Delivery is best-effort, at-most-once; a failed send drops the connection
//! - Registry is never mutated while being iterated

pub mod handler;
pub mod registry;

pub use registry::{ConnectionId, ConnectionRegistry};
