use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::kernel::epoch::FetchSeq;
use crate::kernel::event::Event;
use crate::services::backend::Backend;

/// Fetches the full job list on a fixed cadence and forwards each snapshot.
///
/// Every tick issues its own fetch task tagged with an issue-order `FetchSeq`,
/// so a hung request never holds up the next tick. No merging happens here.
pub struct JobStatusPoller {
    backend: Arc<dyn Backend>,
    period: Duration,
}

/// Running poller. Dropping it does not stop the loop; call `stop`.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: JoinHandle<FetchSeq>,
}

impl JobStatusPoller {
    pub fn new(backend: Arc<dyn Backend>, config: &ClientConfig) -> Self {
        Self::with_period(backend, config.poll_interval)
    }

    pub fn with_period(backend: Arc<dyn Backend>, period: Duration) -> Self {
        Self { backend, period }
    }

    pub fn spawn(self, events: mpsc::Sender<Event>, cancel: CancellationToken) -> PollerHandle {
        let task = tokio::spawn(self.run(events, cancel.clone()));
        PollerHandle { cancel, task }
    }

    /// Returns the last issued sequence number once cancelled.
    async fn run(self, events: mpsc::Sender<Event>, cancel: CancellationToken) -> FetchSeq {
        info!("Job poller started. Period: {:?}", self.period);

        let mut cadence = interval(self.period);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut seq = FetchSeq(0);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = cadence.tick() => {}
            }

            seq = seq.next();
            let backend = self.backend.clone();
            let tx = events.clone();
            let token = cancel.child_token();

            tokio::spawn(async move {
                let fetched = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    fetched = backend.list_jobs() => fetched,
                };

                match fetched {
                    Ok(jobs) => {
                        if token.is_cancelled() {
                            return;
                        }
                        if tx.send(Event::Snapshot { seq, jobs }).await.is_err() {
                            debug!("Snapshot {:?} had no consumer", seq);
                        }
                    }
                    // Next tick retries; nothing to undo.
                    Err(e) => warn!("Job list fetch {:?} failed: {}", seq, e),
                }
            });
        }

        info!("Job poller stopped after {:?}", seq);
        seq
    }
}

impl PollerHandle {
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the loop and every in-flight fetch, then wait for the loop to exit.
    pub async fn stop(self) -> Result<FetchSeq> {
        self.cancel.cancel();
        self.task.await.context("job poller task failed to join")
    }
}
