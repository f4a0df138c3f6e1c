//! Poll health statistics.
//!
//! This module tracks, per SOAP action, how many polls were attempted, how
//! many succeeded, why the others failed and how long they took. The HTTP
//! `/health` endpoint and the `fritzmon_polls_total` counters are fed from
//! the same records.

use chrono::{DateTime, Local};
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::ErrorKind;
use crate::response::{Action, FetchOutcome, Fetched};

/// Running statistics for a single value.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(last, avg, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

#[derive(Clone, Copy)]
struct LastSuccess {
    at: Instant,
    wall: DateTime<Local>,
}

/// Counters of one action.
#[derive(Default)]
pub struct ActionStats {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: [AtomicU64; ErrorKind::ALL.len()],
    pub duration_seconds: Stat,
    last_success: RwLock<Option<LastSuccess>>,
    last_error: RwLock<Option<String>>,
}

impl ActionStats {
    fn record(&self, fetched: &Fetched) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.duration_seconds
            .add_sample(fetched.duration.as_secs_f64());

        match &fetched.outcome {
            FetchOutcome::Succeeded => {
                self.successes.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut guard) = self.last_success.write() {
                    *guard = Some(LastSuccess {
                        at: Instant::now(),
                        wall: Local::now(),
                    });
                }
            }
            FetchOutcome::Defaulted { kind, message } => {
                self.failures[kind.index()].fetch_add(1, Ordering::Relaxed);
                if let Ok(mut guard) = self.last_error.write() {
                    *guard = Some(message.clone());
                }
            }
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self, kind: ErrorKind) -> u64 {
        self.failures[kind.index()].load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        ErrorKind::ALL.iter().map(|k| self.failures(*k)).sum()
    }

    pub fn success_rate(&self) -> f64 {
        let attempts = self.attempts();
        if attempts == 0 {
            100.0
        } else {
            (self.successes() as f64 / attempts as f64) * 100.0
        }
    }

    /// Time since the last successful poll, `None` if there never was one.
    pub fn since_last_success(&self) -> Option<Duration> {
        self.last_success
            .read()
            .ok()
            .and_then(|guard| guard.map(|last| last.at.elapsed()))
    }

    pub fn last_success_str(&self) -> String {
        self.last_success
            .read()
            .ok()
            .and_then(|guard| guard.map(|last| last.wall.format("%H:%M:%S").to_string()))
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().ok().and_then(|guard| guard.clone())
    }
}

/// Poll statistics of every action.
pub struct PollStats {
    actions: [ActionStats; Action::ALL.len()],
    start_time: Instant,
}

impl Default for PollStats {
    fn default() -> Self {
        Self {
            actions: Default::default(),
            start_time: Instant::now(),
        }
    }
}

impl PollStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the outcome of one poll.
    pub fn record(&self, fetched: &Fetched) {
        self.actions[fetched.action.index()].record(fetched);
    }

    pub fn action(&self, action: Action) -> &ActionStats {
        &self.actions[action.index()]
    }

    /// True when `action` has not succeeded within `max_age`, or never has.
    pub fn is_stale(&self, action: Action, max_age: Duration) -> bool {
        self.action(action)
            .since_last_success()
            .map_or(true, |age| age > max_age)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_table(&self) -> String {
        let left_col = 22usize;
        let col_w = 14usize;

        let mut out = String::new();

        writeln!(out, "FRITZMON - POLL HEALTH").ok();
        writeln!(out, "======================").ok();
        writeln!(out).ok();
        writeln!(out, "uptime: {}s", self.uptime_seconds()).ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$}",
            "",
            Action::TransferRates.as_str(),
            Action::LinkLimits.as_str(),
            left = left_col,
            col = col_w
        )
        .ok();

        let row = |out: &mut String, name: &str, cell: &dyn Fn(&ActionStats) -> String| {
            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$}",
                name,
                cell(self.action(Action::TransferRates)),
                cell(self.action(Action::LinkLimits)),
                left = left_col,
                col = col_w
            )
            .ok();
        };

        row(&mut out, "attempts", &|s| s.attempts().to_string());
        row(&mut out, "successes", &|s| s.successes().to_string());
        for kind in ErrorKind::ALL {
            let name = format!("{}_failures", kind);
            row(&mut out, &name, &|s| s.failures(kind).to_string());
        }
        row(&mut out, "success_rate (%)", &|s| {
            format!("{:.1}", s.success_rate())
        });
        row(&mut out, "last_duration (ms)", &|s| {
            format!("{:.1}", s.duration_seconds.snapshot().0 * 1000.0)
        });
        row(&mut out, "avg_duration (ms)", &|s| {
            format!("{:.1}", s.duration_seconds.snapshot().1 * 1000.0)
        });
        row(&mut out, "max_duration (ms)", &|s| {
            format!("{:.1}", s.duration_seconds.snapshot().2 * 1000.0)
        });
        row(&mut out, "last_success", &|s| s.last_success_str());

        writeln!(out).ok();
        for action in Action::ALL {
            if let Some(err) = self.action(action).last_error() {
                writeln!(out, "last {} error: {}", action, err).ok();
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SoapError;
    use crate::response::{LinkLimitsResponse, Response};

    fn success() -> Fetched {
        Fetched::succeeded(
            Response::LinkLimits(LinkLimitsResponse::default()),
            Duration::from_millis(20),
        )
    }

    fn failure() -> Fetched {
        let err = SoapError::Truncated("s:Envelope");
        Fetched::defaulted(Action::LinkLimits, &err, Duration::from_millis(40))
    }

    #[test]
    fn test_running_stat() {
        let mut stat = RunningStat::default();
        assert_eq!(stat.avg(), 0.0);
        for v in [3.0, 1.0, 2.0] {
            stat.add(v);
        }
        assert_eq!(stat.avg(), 2.0);
        assert_eq!(stat.min, 1.0);
        assert_eq!(stat.max, 3.0);
        assert_eq!(stat.last, 2.0);
    }

    #[tokio::test]
    async fn test_record_counts_per_action_and_kind() {
        let stats = PollStats::new();
        stats.record(&success());
        stats.record(&failure());
        stats.record(&success());

        let limits = stats.action(Action::LinkLimits);
        assert_eq!(limits.attempts(), 3);
        assert_eq!(limits.successes(), 2);
        assert_eq!(limits.failures(ErrorKind::Protocol), 1);
        assert_eq!(limits.failures(ErrorKind::Transport), 0);
        assert_eq!(limits.total_failures(), 1);
        assert!(limits.last_error().is_some());

        let rates = stats.action(Action::TransferRates);
        assert_eq!(rates.attempts(), 0);
        assert_eq!(rates.success_rate(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness() {
        let stats = PollStats::new();
        let max_age = Duration::from_secs(5);
        assert!(stats.is_stale(Action::LinkLimits, max_age));

        stats.record(&success());
        assert!(!stats.is_stale(Action::LinkLimits, max_age));

        tokio::time::advance(Duration::from_secs(6)).await;
        stats.record(&failure());
        assert!(stats.is_stale(Action::LinkLimits, max_age));
    }

    #[tokio::test]
    async fn test_render_table() {
        let stats = PollStats::new();
        stats.record(&failure());

        let table = stats.render_table();
        assert!(table.contains("transfer_rates"));
        assert!(table.contains("protocol_failures"));
        assert!(table.contains("last link_limits error:"));
    }
}
