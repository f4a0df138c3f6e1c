//! Wiring of the periodic polling tasks.
//!
//! Three independent jobs run on the scheduler:
//!
//! - transfer rates, every `transfer_period`: fetch and write into the store
//! - link limits, every `limits_period`: fetch and write into the store
//! - tick, every `tick_period`: append the current store snapshot to every
//!   series under the tick's wall-clock label
//!
//! The tick job owns the [`SeriesAggregator`]; everybody else reads the
//! published snapshots.

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::aggregator::{tick_label, SeriesAggregator, SeriesSnapshot, DEFAULT_DATA_LIMIT};
use crate::metric_store::MetricStore;
use crate::poll_stats::PollStats;
use crate::response::{Action, Fetched};
use crate::scheduler::Scheduler;
use crate::soap::SoapClient;

/// Receives every poll result and every tick. Both hooks default to no-ops.
pub trait PollObserver: Send + Sync + 'static {
    fn on_fetched(&self, _fetched: &Fetched) {}

    fn on_tick(&self, _snapshot: &SeriesSnapshot) {}
}

/// Observer that ignores everything.
impl PollObserver for () {}

/// Periods and buffer size of the polling jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    pub transfer_period: Duration,
    pub limits_period: Duration,
    pub tick_period: Duration,
    pub data_limit: usize,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            transfer_period: Duration::from_secs(1),
            limits_period: Duration::from_secs(10),
            tick_period: Duration::from_secs(1),
            data_limit: DEFAULT_DATA_LIMIT,
        }
    }
}

#[derive(Clone)]
struct FetchContext {
    client: Arc<SoapClient>,
    store: Arc<MetricStore>,
    stats: Arc<PollStats>,
    observer: Arc<dyn PollObserver>,
}

/// Schedules one fetch job for `action`.
fn schedule_fetch(
    scheduler: &mut Scheduler,
    name: &'static str,
    period: Duration,
    action: Action,
    ctx: FetchContext,
) {
    let client = ctx.client.clone();
    scheduler.schedule(
        name,
        period,
        move || {
            let client = client.clone();
            async move { client.fetch(action).await }
        },
        move |fetched: Fetched| {
            let written = ctx.store.apply(&fetched.response);
            debug!(
                action = %fetched.action,
                success = fetched.is_success(),
                written,
                "poll completed"
            );
            ctx.stats.record(&fetched);
            ctx.observer.on_fetched(&fetched);
        },
    );
}

/// Starts the transfer, limits and tick jobs on `scheduler` and returns a
/// receiver of the series published on every tick.
pub fn spawn_poller(
    scheduler: &mut Scheduler,
    client: Arc<SoapClient>,
    store: Arc<MetricStore>,
    stats: Arc<PollStats>,
    observer: Arc<dyn PollObserver>,
    settings: PollerSettings,
) -> watch::Receiver<SeriesSnapshot> {
    info!(
        endpoint = client.endpoint(),
        transfer_period = ?settings.transfer_period,
        limits_period = ?settings.limits_period,
        tick_period = ?settings.tick_period,
        data_limit = settings.data_limit,
        "Starting poller"
    );

    let ctx = FetchContext {
        client,
        store: store.clone(),
        stats,
        observer: observer.clone(),
    };
    schedule_fetch(
        scheduler,
        "transfer_rates",
        settings.transfer_period,
        Action::TransferRates,
        ctx.clone(),
    );
    schedule_fetch(
        scheduler,
        "link_limits",
        settings.limits_period,
        Action::LinkLimits,
        ctx,
    );

    let mut aggregator = SeriesAggregator::new(settings.data_limit);
    let series = aggregator.subscribe();

    scheduler.schedule(
        "tick",
        settings.tick_period,
        || async { Local::now() },
        move |fired_at: DateTime<Local>| {
            let label = tick_label(&fired_at);
            aggregator.on_tick(&label, &store.snapshot());
            debug!(label = %label, "tick");
            observer.on_tick(&aggregator.current_series());
        },
    );

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PollerSettings::default();
        assert_eq!(settings.transfer_period, Duration::from_secs(1));
        assert_eq!(settings.limits_period, Duration::from_secs(10));
        assert_eq!(settings.tick_period, Duration::from_secs(1));
        assert_eq!(settings.data_limit, 20);
    }
}
