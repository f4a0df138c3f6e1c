//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns the
//! poll statistics table. The status is 503 while transfer rate polling is
//! stale, i.e. the displayed rates no longer move.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use fritzmon::Action;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Periods without a successful poll before an action counts as stale.
const STALE_PERIODS: u32 = 3;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let settings = state.config.poller_settings();
    let timeout = state.config.soap_settings().request_timeout;
    let transfer_stale = state.poll_stats.is_stale(
        Action::TransferRates,
        stale_after(settings.transfer_period, timeout),
    );
    let limits_stale = state.poll_stats.is_stale(
        Action::LinkLimits,
        stale_after(settings.limits_period, timeout),
    );

    let status = if transfer_stale {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let message = match (transfer_stale, limits_stale) {
        (false, false) => "OK",
        (false, true) => "OK - link limits stale",
        (true, _) => "Transfer rates stale",
    };

    let uptime_hours = state.start_time.elapsed().as_secs_f64() / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = state.poll_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\n\n{table}"),
    )
}

/// Stale threshold for a job polling every `period`, plus one request
/// timeout of slack.
fn stale_after(period: Duration, timeout: Duration) -> Duration {
    period * STALE_PERIODS + timeout
}
