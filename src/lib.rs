//! # Demandcast
//!
//! HTTP service that turns an uploaded demand-history CSV into a structured
//! forecast by invoking an external forecasting model as a subprocess.
//!
//! ## Modules
//!
//! - `config` - Runtime configuration assembled from CLI flags
//! - `error` - Request-level error taxonomy and HTTP mapping
//! - `forecast` - Model invocation, output translation, and the per-request pipeline
//! - `server` - Axum router and multipart upload endpoint
//! - `subprocess` - Unified subprocess abstraction layer for testing
//! - `upload` - Transient upload storage with guaranteed cleanup

pub mod config;
pub mod error;
pub mod forecast;
pub mod server;
pub mod subprocess;
pub mod upload;
