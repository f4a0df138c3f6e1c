//! Prometheus metrics definitions for fritzmon.
//!
//! The poller reports every fetch and every tick here; `/metrics` only
//! gathers the registry.

use fritzmon::{FetchOutcome, Fetched, PollObserver, SeriesSnapshot};
use prometheus::{Counter, CounterVec, GaugeVec, Opts, Registry};

/// Outcome label of a successful poll.
const OUTCOME_SUCCESS: &str = "success";

/// Collection of Prometheus metrics exported by the monitor.
#[derive(Clone)]
pub struct MonitorMetrics {
    pub rate_bytes_per_second: GaugeVec, // labels: metric
    pub polls_total: CounterVec,         // labels: action, outcome
    pub poll_duration_seconds: GaugeVec, // labels: action
    pub ticks_total: Counter,
}

impl MonitorMetrics {
    /// Creates and registers all Prometheus metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let rate_bytes_per_second = GaugeVec::new(
            Opts::new(
                "fritzmon_rate_bytes_per_second",
                "Latest value of each series in bytes per second",
            ),
            &["metric"],
        )?;
        let polls_total = CounterVec::new(
            Opts::new(
                "fritzmon_polls_total",
                "SOAP polls by action and outcome (success, transport, protocol, mapping)",
            ),
            &["action", "outcome"],
        )?;
        let poll_duration_seconds = GaugeVec::new(
            Opts::new(
                "fritzmon_poll_duration_seconds",
                "Duration of the last SOAP poll per action",
            ),
            &["action"],
        )?;
        let ticks_total = Counter::new(
            "fritzmon_ticks_total",
            "Number of points appended to the series",
        )?;

        registry.register(Box::new(rate_bytes_per_second.clone()))?;
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;

        Ok(Self {
            rate_bytes_per_second,
            polls_total,
            poll_duration_seconds,
            ticks_total,
        })
    }
}

impl PollObserver for MonitorMetrics {
    fn on_fetched(&self, fetched: &Fetched) {
        let action = fetched.action.as_str();
        let outcome = match &fetched.outcome {
            FetchOutcome::Succeeded => OUTCOME_SUCCESS,
            FetchOutcome::Defaulted { kind, .. } => kind.as_str(),
        };

        self.polls_total.with_label_values(&[action, outcome]).inc();
        self.poll_duration_seconds
            .with_label_values(&[action])
            .set(fetched.duration.as_secs_f64());
    }

    fn on_tick(&self, snapshot: &SeriesSnapshot) {
        self.ticks_total.inc();
        for series in &snapshot.series {
            if let Some(point) = series.points.last() {
                self.rate_bytes_per_second
                    .with_label_values(&[series.metric.as_str()])
                    .set(point.value as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fritzmon::response::{LinkLimitsResponse, Response};
    use fritzmon::{Action, SoapError};
    use std::time::Duration;

    #[test]
    fn test_polls_counted_by_outcome() {
        let registry = Registry::new();
        let metrics = MonitorMetrics::new(&registry).unwrap();

        metrics.on_fetched(&Fetched::succeeded(
            Response::LinkLimits(LinkLimitsResponse::default()),
            Duration::from_millis(15),
        ));
        let err = SoapError::Truncated("s:Body");
        metrics.on_fetched(&Fetched::defaulted(Action::LinkLimits, &err, Duration::ZERO));

        let success = metrics
            .polls_total
            .with_label_values(&["link_limits", "success"])
            .get();
        let protocol = metrics
            .polls_total
            .with_label_values(&["link_limits", "protocol"])
            .get();
        assert_eq!(success, 1.0);
        assert_eq!(protocol, 1.0);
        assert_eq!(
            metrics
                .poll_duration_seconds
                .with_label_values(&["link_limits"])
                .get(),
            0.0
        );
    }
}
