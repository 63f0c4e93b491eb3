//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; subscriber initialized in main
//! - Metrics are cheap (atomic increments behind the metrics facade)
//! - Prometheus exporter is optional and bound on its own address

pub mod metrics;
