//! HTTP endpoint handlers for the monitor.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Plain-text index
//! - `/series`: JSON snapshot of the rolling series
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: Poll health table

pub mod health;
pub mod metrics;
pub mod root;
pub mod series;

// Re-export handlers
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
pub use series::series_handler;
