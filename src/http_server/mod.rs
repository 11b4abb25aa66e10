//! # HTTP Server Module
//!
//! Transport adapter in front of `DocumentService`.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/contentlets` - Save, delete and list documents
//! - `/observability/metrics` - Counters

pub mod config;
pub mod contentlet_routes;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
