//! REST Express server library.

pub mod api;
pub mod config;
pub mod http;
pub mod observability;
pub mod security;
pub mod status;
pub mod web;
pub mod ws;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
