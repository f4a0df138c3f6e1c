//! Series aggregator holding one rolling history per metric.
//!
//! This module provides the `SeriesAggregator` which keeps a ringbuffer per
//! metric and appends one point to each of them on every tick. All four
//! series share the tick's label, so they line up on one time axis.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tokio::sync::watch;

use crate::metric_store::{Metric, MetricSnapshot};
use crate::ringbuffer::{Point, Ringbuffer};

/// Number of points kept per series.
pub const DEFAULT_DATA_LIMIT: usize = 20;

/// strftime pattern of point labels.
pub const LABEL_FORMAT: &str = "%H:%M:%S";

/// Formats a tick's fire time as a point label.
pub fn tick_label<Tz>(fired_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fired_at.format(LABEL_FORMAT).to_string()
}

/// Ordered history of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub metric: Metric,
    pub points: Vec<Point>,
}

/// Read-only copy of every series, in `Metric::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesSnapshot {
    pub capacity: usize,
    pub ticks: u64,
    pub series: Vec<Series>,
}

impl SeriesSnapshot {
    fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            ticks: 0,
            series: Metric::ALL
                .into_iter()
                .map(|metric| Series {
                    metric,
                    points: Vec::new(),
                })
                .collect(),
        }
    }

    /// Points of one metric, oldest first.
    pub fn points(&self, metric: Metric) -> &[Point] {
        self.series
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }
}

/// Statistics about the series buffers.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStats {
    pub capacity: usize,
    pub points_per_series: usize,
    pub ticks: u64,
}

/// Owner of the per-metric ringbuffers. Only the tick task mutates it;
/// readers get snapshots through [`SeriesAggregator::subscribe`].
pub struct SeriesAggregator {
    buffers: [Ringbuffer<Point>; Metric::COUNT],
    capacity: usize,
    ticks: u64,
    publisher: watch::Sender<SeriesSnapshot>,
}

impl SeriesAggregator {
    /// Creates an aggregator keeping `capacity` points per series.
    pub fn new(capacity: usize) -> Self {
        let buffers = std::array::from_fn(|_| Ringbuffer::new(capacity));
        let capacity = capacity.max(1);
        let (publisher, _) = watch::channel(SeriesSnapshot::empty(capacity));

        Self {
            buffers,
            capacity,
            ticks: 0,
            publisher,
        }
    }

    /// Appends `Point{label, snapshot[metric]}` to every series and
    /// publishes the new state to subscribers.
    pub fn on_tick(&mut self, label: &str, snapshot: &MetricSnapshot) {
        for (metric, value) in snapshot.iter() {
            self.buffers[metric.index()].push(Point::new(label, value));
        }
        self.ticks += 1;

        // send_replace stores the value even when nobody listens yet
        self.publisher.send_replace(self.current_series());
    }

    /// Returns the current history of every metric.
    pub fn current_series(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            capacity: self.capacity,
            ticks: self.ticks,
            series: Metric::ALL
                .into_iter()
                .map(|metric| Series {
                    metric,
                    points: self.buffers[metric.index()].get_history(),
                })
                .collect(),
        }
    }

    /// Receiver that always holds the snapshot of the latest tick.
    pub fn subscribe(&self) -> watch::Receiver<SeriesSnapshot> {
        self.publisher.subscribe()
    }

    pub fn stats(&self) -> SeriesStats {
        SeriesStats {
            capacity: self.capacity,
            points_per_series: self.buffers[0].len(),
            ticks: self.ticks,
        }
    }
}
