//! Root endpoint handler.
//!
//! This module provides the `/` endpoint handler that lists the available
//! endpoints together with the current values.

use axum::{extract::State, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;

    let mut out = String::new();
    writeln!(out, "fritzmon {}", version).ok();
    writeln!(out, "uptime: {}h {}m {}s", hours, minutes, seconds).ok();
    writeln!(out, "router: {}", state.config.endpoint_url()).ok();
    writeln!(out).ok();

    writeln!(out, "current values (bytes/sec):").ok();
    for (metric, value) in state.store.snapshot().iter() {
        writeln!(out, "  {:8} {}", metric.as_str(), value).ok();
    }
    writeln!(out).ok();

    writeln!(out, "endpoints:").ok();
    writeln!(out, "  /series   JSON series snapshot (?metric=sent|recv|sentMax|recvMax)").ok();
    writeln!(out, "  /metrics  Prometheus metrics").ok();
    writeln!(out, "  /health   poll health").ok();

    ([("Content-Type", "text/plain; charset=utf-8")], out)
}
