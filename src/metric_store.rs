//! Latest-known value per displayed metric.
//!
//! Fetch callbacks write into the store, the tick task reads a snapshot of
//! all four values at once. A response field that is absent leaves the
//! previous value in place.

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::response::Response;

/// The four quantities shown in the rolling history, all in bytes/sec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "recv")]
    Recv,
    #[serde(rename = "sentMax")]
    SentMax,
    #[serde(rename = "recvMax")]
    RecvMax,
}

impl Metric {
    pub const COUNT: usize = 4;
    pub const ALL: [Metric; Metric::COUNT] =
        [Metric::Sent, Metric::Recv, Metric::SentMax, Metric::RecvMax];

    pub fn index(&self) -> usize {
        match self {
            Metric::Sent => 0,
            Metric::Recv => 1,
            Metric::SentMax => 2,
            Metric::RecvMax => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sent => "sent",
            Metric::Recv => "recv",
            Metric::SentMax => "sentMax",
            Metric::RecvMax => "recvMax",
        }
    }

    /// Parses the serialized name (`sent`, `recv`, `sentMax`, `recvMax`).
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consistent copy of all four values taken under one lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricSnapshot {
    values: [u64; Metric::COUNT],
}

impl MetricSnapshot {
    pub fn get(&self, metric: Metric) -> u64 {
        self.values[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, u64)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

/// Process-wide table of the last value seen per metric.
#[derive(Debug, Default)]
pub struct MetricStore {
    values: Mutex<[u64; Metric::COUNT]>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, metric: Metric, value: u64) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values[metric.index()] = value;
    }

    /// Applies every present value under a single lock and returns how many
    /// metrics were overwritten. `None` entries are skipped.
    pub fn update<I>(&self, updates: I) -> usize
    where
        I: IntoIterator<Item = (Metric, Option<u64>)>,
    {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut written = 0;
        for (metric, value) in updates {
            if let Some(value) = value {
                values[metric.index()] = value;
                written += 1;
            }
        }
        written
    }

    /// Applies the metric-bearing fields of a poll response.
    pub fn apply(&self, response: &Response) -> usize {
        self.update(response.metric_updates())
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        MetricSnapshot { values: *values }
    }

    pub fn get(&self, metric: Metric) -> u64 {
        self.snapshot().get(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{LinkLimitsResponse, TransferRatesResponse};

    #[test]
    fn test_defaults_to_zero() {
        let store = MetricStore::new();
        for metric in Metric::ALL {
            assert_eq!(store.get(metric), 0);
        }
    }

    #[test]
    fn test_absent_field_is_noop() {
        let store = MetricStore::new();
        store.set(Metric::Sent, 500);
        store.set(Metric::Recv, 700);

        let written = store.apply(&Response::TransferRates(TransferRatesResponse::default()));
        assert_eq!(written, 0);
        assert_eq!(store.get(Metric::Sent), 500);
        assert_eq!(store.get(Metric::Recv), 700);
    }

    #[test]
    fn test_partial_response_updates_only_present_fields() {
        let store = MetricStore::new();
        store.set(Metric::Recv, 42);

        let response = TransferRatesResponse {
            byte_send_rate: Some(1200),
            ..Default::default()
        };
        assert_eq!(store.apply(&Response::TransferRates(response)), 1);
        assert_eq!(store.get(Metric::Sent), 1200);
        assert_eq!(store.get(Metric::Recv), 42);
    }

    #[test]
    fn test_link_limits_are_converted_to_bytes() {
        let store = MetricStore::new();
        let response = LinkLimitsResponse {
            layer1_downstream_max_bit_rate: Some(8000),
            layer1_upstream_max_bit_rate: Some(1_000_000),
            ..Default::default()
        };
        store.apply(&Response::LinkLimits(response));

        assert_eq!(store.get(Metric::RecvMax), 1000);
        assert_eq!(store.get(Metric::SentMax), 125_000);
        assert_eq!(store.get(Metric::Sent), 0);
    }

    #[test]
    fn test_metric_names_roundtrip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_name(metric.as_str()), Some(metric));
        }
        assert_eq!(Metric::from_name("bogus"), None);
    }
}
