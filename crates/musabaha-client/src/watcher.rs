//! Polling watcher that reports newly arrived records
//!
//! The watcher owns its panel and runs on a spawned task. The first poll only
//! records a baseline; each later poll reports the records whose ids were not
//! in the previous successful poll. Cancelling the token, calling
//! [`Watcher::shutdown`], or dropping the [`Watcher`] stops the task.

use crate::error::ClientError;
use crate::panel::ResourcePanel;
use crate::resource::RemoteResource;
use musabaha_core::RecordId;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 16;
const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Something the watcher observed
#[derive(Debug)]
pub enum WatchEvent<R> {
    /// Records not present in the previous poll
    NewRecords(Vec<R>),
    /// A poll failed; the watcher keeps going
    PollFailed(ClientError),
}

/// Handle to a running watcher task
#[derive(Debug)]
pub struct Watcher<R> {
    cancel: CancellationToken,
    events: mpsc::Receiver<WatchEvent<R>>,
    handle: Option<JoinHandle<()>>,
}

impl<R: RemoteResource> Watcher<R> {
    /// Start polling `panel` every `period`
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(panel: ResourcePanel<R>, period: Duration) -> Self {
        Self::spawn_with_token(panel, period, CancellationToken::new())
    }

    /// Start polling with an externally owned cancellation token
    #[must_use]
    pub fn spawn_with_token(
        panel: ResourcePanel<R>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let handle = tokio::spawn(poll_loop(panel, period, tx, cancel.clone()));

        Self {
            cancel,
            events,
            handle: Some(handle),
        }
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the watcher has stopped.
    pub async fn next_event(&mut self) -> Option<WatchEvent<R>> {
        self.events.recv().await
    }

    /// Token that stops this watcher when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask the task to stop without waiting
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the polling task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(resource = R::NAME, error = %e, "Watcher task ended abnormally");
        }
    }
}

impl<R> Drop for Watcher<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop<R: RemoteResource>(
    mut panel: ResourcePanel<R>,
    period: Duration,
    tx: mpsc::Sender<WatchEvent<R>>,
    cancel: CancellationToken,
) {
    info!(resource = R::NAME, period_secs = period.as_secs_f64(), "Watcher started");

    let mut ticker = interval(period.max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous: Option<HashSet<RecordId>> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = panel.refresh() => result,
        };

        let event = match result {
            Ok(_) => {
                let current: HashSet<RecordId> =
                    panel.records().iter().map(|r| r.id().clone()).collect();
                let fresh: Vec<R> = match &previous {
                    Some(seen) => panel
                        .records()
                        .iter()
                        .filter(|r| !seen.contains(r.id()))
                        .cloned()
                        .collect(),
                    None => Vec::new(),
                };
                previous = Some(current);

                if fresh.is_empty() {
                    debug!(resource = R::NAME, "No new records");
                    continue;
                }
                info!(resource = R::NAME, count = fresh.len(), "New records");
                WatchEvent::NewRecords(fresh)
            }
            Err(e) => WatchEvent::PollFailed(e),
        };

        let delivered = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sent = tx.send(event) => sent.is_ok(),
        };
        if !delivered {
            debug!(resource = R::NAME, "Event receiver dropped");
            break;
        }
    }

    info!(resource = R::NAME, "Watcher stopped");
}
