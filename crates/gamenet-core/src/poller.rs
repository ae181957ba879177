// ── Status poller ──
//
// Fetches the client status list immediately and then on a fixed
// interval, publishing each result through a `watch` channel. Every tick
// starts its own fetch, so a hung request never delays the next one.
// Fetches are numbered when issued and a result is applied only if it is
// newer than the snapshot already published; a slow response that
// resolves after a faster, later one is dropped. Failures are logged and
// leave the last good snapshot in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::console::Console;
use crate::model::Client;

/// The most recently applied status fetch.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    /// Sequence number of the fetch that produced this snapshot; 0 before
    /// the first success.
    pub sequence: u64,
    pub clients: Arc<Vec<Client>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.sequence > 0
    }
}

/// What happened to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Published as the new snapshot.
    Applied,
    /// A newer fetch had already been published; result discarded.
    Stale,
    /// The fetch failed; the previous snapshot is kept.
    Failed,
    /// Cancelled before the fetch completed.
    Cancelled,
}

/// Periodic status fetcher. Cheaply cloneable; clones share state.
pub struct StatusPoller<C> {
    inner: Arc<PollerInner<C>>,
}

impl<C> Clone for StatusPoller<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PollerInner<C> {
    console: C,
    interval: Duration,
    snapshot: watch::Sender<StatusSnapshot>,
    next_sequence: AtomicU64,
    cancel: CancellationToken,
}

impl<C: Console + 'static> StatusPoller<C> {
    pub fn new(console: C, interval: Duration, cancel: CancellationToken) -> Self {
        let (snapshot, _) = watch::channel(StatusSnapshot::default());
        Self {
            inner: Arc::new(PollerInner {
                console,
                interval,
                snapshot,
                next_sequence: AtomicU64::new(0),
                cancel,
            }),
        }
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Snapshot changes as a stream, starting with the current value.
    pub fn stream(&self) -> WatchStream<StatusSnapshot> {
        WatchStream::new(self.subscribe())
    }

    /// The snapshot currently published.
    pub fn current(&self) -> StatusSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Issue one fetch and apply its result if it is still the newest.
    pub async fn poll_once(&self) -> PollOutcome {
        let sequence = self.inner.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let result = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => return PollOutcome::Cancelled,
            result = self.inner.console.fetch_status() => result,
        };

        match result {
            Ok(clients) => self.apply(sequence, clients),
            Err(e) => {
                warn!(error = %e, sequence, "status poll failed");
                PollOutcome::Failed
            }
        }
    }

    fn apply(&self, sequence: u64, clients: Vec<Client>) -> PollOutcome {
        let applied = self.inner.snapshot.send_if_modified(|snap| {
            if sequence <= snap.sequence {
                return false;
            }
            *snap = StatusSnapshot {
                sequence,
                clients: Arc::new(clients),
                fetched_at: Some(Utc::now()),
            };
            true
        });

        if applied {
            PollOutcome::Applied
        } else {
            debug!(sequence, "dropping stale status response");
            PollOutcome::Stale
        }
    }

    /// Spawn the polling loop: one fetch immediately, then one per interval.
    ///
    /// The loop exits when the poller's cancellation token fires.
    pub fn start(&self) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poller.inner.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = poller.inner.cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let tick = poller.clone();
                        tokio::spawn(async move {
                            tick.poll_once().await;
                        });
                    }
                }
            }
            debug!("status poller stopped");
        })
    }

    /// Schedule a one-off fetch after `delay` (used after a reboot request).
    pub fn refresh_after(&self, delay: Duration) -> JoinHandle<PollOutcome> {
        let poller = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = poller.inner.cancel.cancelled() => PollOutcome::Cancelled,
                () = tokio::time::sleep(delay) => poller.poll_once().await,
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeConsole, StatusReply, client};

    fn poller(console: &FakeConsole) -> StatusPoller<FakeConsole> {
        StatusPoller::new(
            console.clone(),
            Duration::from_secs(10),
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_is_immediate_then_every_interval() {
        let console = FakeConsole::with_clients(vec![client(1, "PC-01", true)]);
        let poller = poller(&console);
        let handle = poller.start();

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(console.status_calls(), 1);
        assert_eq!(poller.current().clients.len(), 1);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(console.status_calls(), 3);

        poller.inner.cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_does_not_delay_next_tick() {
        let console = FakeConsole::with_clients(vec![client(1, "PC-01", false)]);
        console.script_status([StatusReply::Hang]);
        let poller = poller(&console);
        let handle = poller.start();

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(console.status_calls(), 2);
        assert!(poller.current().is_loaded());

        poller.inner.cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_never_overwrites_newer_one() {
        let console = FakeConsole::default();
        console.script_status([
            StatusReply::After(Duration::from_secs(5), vec![client(1, "old", false)]),
            StatusReply::After(Duration::from_secs(1), vec![client(1, "new", true)]),
        ]);
        let poller = poller(&console);

        let (first, second) = tokio::join!(poller.poll_once(), poller.poll_once());

        assert_eq!(first, PollOutcome::Stale);
        assert_eq!(second, PollOutcome::Applied);
        let snap = poller.current();
        assert_eq!(snap.sequence, 2);
        assert_eq!(snap.clients[0].name, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_last_good_snapshot() {
        let console = FakeConsole::default();
        console.script_status([
            StatusReply::After(Duration::ZERO, vec![client(1, "PC-01", true)]),
            StatusReply::Fail,
        ]);
        let poller = poller(&console);

        assert_eq!(poller.poll_once().await, PollOutcome::Applied);
        assert_eq!(poller.poll_once().await, PollOutcome::Failed);

        let snap = poller.current();
        assert_eq!(snap.sequence, 1);
        assert_eq!(snap.clients[0].name, "PC-01");
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_after_waits_for_delay() {
        let console = FakeConsole::with_clients(vec![client(1, "PC-01", true)]);
        let poller = poller(&console);

        let pending = poller.refresh_after(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(console.status_calls(), 0);

        assert_eq!(pending.await.unwrap(), PollOutcome::Applied);
        assert_eq!(console.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop() {
        let console = FakeConsole::with_clients(Vec::new());
        let poller = poller(&console);
        let handle = poller.start();

        poller.inner.cancel.cancel();
        handle.await.unwrap();

        let calls = console.status_calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(console.status_calls(), calls);
    }
}
