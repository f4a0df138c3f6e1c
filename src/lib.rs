//! fritzmon library
//!
//! Polls a FRITZ!Box (or any device exposing the UPnP
//! `WANCommonInterfaceConfig:1` service) for WAN transfer rates and link
//! limits, and keeps a short rolling history of four values:
//!
//! - `sent` / `recv`: current upstream and downstream rate in bytes/sec
//! - `sentMax` / `recvMax`: physical link limits in bytes/sec
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fritzmon::{
//!     spawn_poller, MetricStore, PollStats, PollerSettings, Scheduler, SoapClient, SoapSettings,
//! };
//!
//! # async fn run() -> Result<(), fritzmon::SoapError> {
//! let client = SoapClient::new(SoapSettings {
//!     endpoint: "http://192.168.178.1:49000/igdupnp/control/WANCommonIFC1".to_string(),
//!     request_timeout: Duration::from_secs(5),
//!     connect_timeout: Duration::from_secs(2),
//! })?;
//!
//! let mut scheduler = Scheduler::new();
//! let mut series = spawn_poller(
//!     &mut scheduler,
//!     Arc::new(client),
//!     Arc::new(MetricStore::new()),
//!     Arc::new(PollStats::new()),
//!     Arc::new(()),
//!     PollerSettings::default(),
//! );
//!
//! while series.changed().await.is_ok() {
//!     let snapshot = series.borrow().clone();
//!     println!("{} ticks", snapshot.ticks);
//! }
//! scheduler.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod error;
pub mod metric_store;
pub mod poll_stats;
pub mod poller;
pub mod response;
pub mod ringbuffer;
pub mod scheduler;
pub mod soap;

// Re-export main types for convenience
pub use aggregator::{Series, SeriesAggregator, SeriesSnapshot};
pub use error::{ErrorKind, SoapError};
pub use metric_store::{Metric, MetricSnapshot, MetricStore};
pub use poll_stats::PollStats;
pub use poller::{spawn_poller, PollObserver, PollerSettings};
pub use response::{Action, FetchOutcome, Fetched, Response};
pub use scheduler::Scheduler;
pub use soap::{SoapClient, SoapSettings};
