//! Periodic task scheduler.
//!
//! Every scheduled job runs on its own tokio task: do the work, hand the
//! result to the completion callback, sleep for the period, repeat. The
//! period is measured from completion, so a slow run delays that job's next
//! run instead of overlapping with it. Jobs never wait on each other.

use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<u64>,
}

/// Runs independent periodic jobs until stopped.
#[derive(Default)]
pub struct Scheduler {
    shutdown: CancellationToken,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a job that runs `work` immediately and then `period` after each
    /// completion, passing every result to `on_complete`.
    ///
    /// A panic in `work` or `on_complete` is logged and the job keeps its
    /// schedule. Must be called from within a tokio runtime.
    pub fn schedule<W, Fut, T, C>(
        &mut self,
        name: &'static str,
        period: Duration,
        mut work: W,
        mut on_complete: C,
    ) where
        W: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnMut(T) + Send + 'static,
    {
        let shutdown = self.shutdown.child_token();

        let handle = tokio::spawn(async move {
            debug!(task = name, ?period, "periodic task started");
            let mut runs: u64 = 0;

            while !shutdown.is_cancelled() {
                // An in-flight run is never interrupted; stopping only
                // prevents the next one.
                let run = match std::panic::catch_unwind(AssertUnwindSafe(&mut work)) {
                    Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                    Err(panic) => Err(panic),
                };
                match run {
                    Ok(result) => {
                        let completed =
                            std::panic::catch_unwind(AssertUnwindSafe(|| on_complete(result)));
                        if completed.is_err() {
                            error!(task = name, "completion callback panicked");
                        }
                    }
                    Err(_) => error!(task = name, "periodic task panicked, keeping schedule"),
                }
                runs += 1;

                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(period) => {}
                }
            }

            debug!(task = name, runs, "periodic task stopped");
            runs
        });

        self.tasks.push(ScheduledTask { name, handle });
    }

    /// Number of scheduled jobs.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Token cancelled when the scheduler stops.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops all jobs from starting another run.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Waits for every job to exit. Returns the number of completed runs per
    /// job name.
    pub async fn join(mut self) -> Vec<(&'static str, u64)> {
        let mut summary = Vec::with_capacity(self.tasks.len());
        for task in self.tasks.drain(..) {
            match task.handle.await {
                Ok(runs) => summary.push((task.name, runs)),
                Err(e) => error!(task = task.name, "periodic task ended abnormally: {}", e),
            }
        }
        summary
    }

    /// Stops all jobs and waits until they have exited.
    pub async fn shutdown(self) -> Vec<(&'static str, u64)> {
        self.stop();
        let summary = self.join().await;
        info!("Scheduler stopped after {} task(s)", summary.len());
        summary
    }
}
