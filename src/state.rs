//! Application state management for fritzmon.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. The polling tasks own their data; the state only holds
//! read handles.

use fritzmon::{MetricStore, PollStats, SeriesSnapshot};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub store: Arc<MetricStore>,
    /// Series published by the tick task.
    pub series: watch::Receiver<SeriesSnapshot>,
    pub poll_stats: Arc<PollStats>,
    pub config: Arc<Config>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
