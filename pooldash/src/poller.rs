//! Periodic fetch task shared by every polled page.
//!
//! A [`DataPoller`] runs one fetch action on a fixed cadence and publishes
//! each successful result into a single watch cell. The lifecycle:
//!
//! ```text
//!  spawn ──► fetch ──ok──► publish ──┐
//!              ▲   └─err──► log ─────┤
//!              │                     ▼
//!              └──────── tick ◄── wait interval
//!
//!  stop/drop ──► inactive: pending tick cancelled, late results dropped
//! ```
//!
//! Fetches never overlap. If one outlasts the interval, the ticks it
//! covered are skipped and the next fetch starts at the following tick, so
//! publishes always land in the order the fetches resolved.
//!
//! Publishing and deactivation both go through the watch cell's lock. Once
//! [`DataPoller::stop`] returns, nothing further is published, even on a
//! multi-threaded runtime where the fetch resolves concurrently.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, select_all};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::tracing::prelude::*;

/// Contents of a poller's watch cell.
#[derive(Debug)]
pub struct Published<T> {
    value: Option<Arc<T>>,
    publishes: u64,
    last_error: Option<String>,
    active: bool,
}

impl<T> Published<T> {
    fn new() -> Self {
        Self {
            value: None,
            publishes: 0,
            last_error: None,
            active: true,
        }
    }

    /// Latest successfully fetched value.
    pub fn value(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    /// Number of successful publishes so far.
    pub fn publishes(&self) -> u64 {
        self.publishes
    }

    /// Error of the most recent fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A running periodic fetch.
///
/// Dropping the poller deactivates it.
pub struct DataPoller<T> {
    name: &'static str,
    cell: Arc<watch::Sender<Published<T>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<T> DataPoller<T>
where
    T: Send + Sync + 'static,
{
    /// Start polling: fetch now, then once per `interval`.
    ///
    /// `cancel` is usually a child of the owning page's token so the page
    /// can tear all of its pollers down at once. Must be called from within
    /// a tokio runtime.
    pub fn spawn<F, Fut, E>(
        name: &'static str,
        interval: Duration,
        cancel: CancellationToken,
        fetch: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, _) = watch::channel(Published::new());
        let cell = Arc::new(tx);

        let task = tokio::spawn(run(name, interval, cancel.clone(), cell.clone(), fetch));

        Self {
            name,
            cell,
            cancel,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Latest published value, if any fetch has succeeded yet.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.cell.borrow().value.clone()
    }

    pub fn publish_count(&self) -> u64 {
        self.cell.borrow().publishes
    }

    pub fn last_error(&self) -> Option<String> {
        self.cell.borrow().last_error.clone()
    }

    pub fn is_active(&self) -> bool {
        self.cell.borrow().active
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Published<T>> {
        self.cell.subscribe()
    }

    /// Wait for a publish or deactivation that happens after this call.
    ///
    /// Each call starts from a fresh receiver, so a publish landing between
    /// two calls is not observed. Hold a [`subscribe`](Self::subscribe)
    /// receiver (or a [`PageUpdates`]) to see every change.
    pub async fn changed(&self) {
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = self.subscribe().changed().await;
    }

    /// Deactivate: cancel the pending tick and discard any in-flight result.
    ///
    /// Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
        let was_active = self.cell.send_if_modified(|cell| {
            let was_active = cell.active;
            cell.active = false;
            was_active
        });
        if was_active {
            debug!(poller = self.name, "Poller stopped");
        }
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(poller = self.name, error = %e, "Poller task ended abnormally");
            }
        }
    }
}

impl<T> Drop for DataPoller<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.cell.send_if_modified(|cell| {
            let was_active = cell.active;
            cell.active = false;
            was_active
        });
    }
}

async fn run<T, F, Fut, E>(
    name: &'static str,
    interval: Duration,
    cancel: CancellationToken,
    cell: Arc<watch::Sender<Published<T>>>,
    fetch: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    trace!(poller = name, ?interval, "Poller task started");

    // The first tick completes immediately.
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = fetch() => result,
        };

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                let published = cell.send_if_modified(|cell| {
                    if !cell.active {
                        return false;
                    }
                    cell.value = Some(value);
                    cell.publishes += 1;
                    cell.last_error = None;
                    true
                });
                if published {
                    trace!(poller = name, "Published new snapshot");
                } else {
                    break;
                }
            }
            Err(e) => {
                warn!(poller = name, error = %e, "Fetch failed; keeping last snapshot");
                // Record the error without waking subscribers: nothing a
                // page renders has changed.
                cell.send_if_modified(|cell| {
                    if cell.active {
                        cell.last_error = Some(e.to_string());
                    }
                    false
                });
            }
        }
    }

    trace!(poller = name, "Poller task stopped");
}

/// Waits for the next publish from any of a page's pollers.
pub struct PageUpdates {
    sources: Vec<Box<dyn ChangeSource>>,
}

trait ChangeSource: Send {
    fn changed(&mut self) -> BoxFuture<'_, bool>;
}

impl<T: Send + Sync> ChangeSource for watch::Receiver<Published<T>> {
    fn changed(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move { watch::Receiver::changed(self).await.is_ok() })
    }
}

impl PageUpdates {
    pub(crate) fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub(crate) fn with<T: Send + Sync + 'static>(mut self, poller: &DataPoller<T>) -> Self {
        self.sources.push(Box::new(poller.subscribe()));
        self
    }

    /// Resolve on the next publish. Returns `false` once a poller is gone
    /// and nothing more can arrive.
    pub async fn next(&mut self) -> bool {
        if self.sources.is_empty() {
            return false;
        }
        let pending = self.sources.iter_mut().map(|source| source.changed());
        let (alive, _, _) = select_all(pending).await;
        alive
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    use tokio::sync::Notify;
    use tokio::time;

    use super::*;

    // Tests run with a paused clock; `settle` lets the poller task run to
    // its next suspension point without advancing time.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    const INTERVAL: Duration = Duration::from_secs(10);

    fn counting_poller() -> (DataPoller<u64>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let poller = DataPoller::spawn("count", INTERVAL, CancellationToken::new(), move || {
            let counter = counter.clone();
            async move { Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });
        (poller, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_on_spawn() {
        let (poller, _) = counting_poller();
        settle().await;

        assert_eq!(poller.publish_count(), 1);
        assert_eq!(poller.latest().as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn n_ticks_give_n_plus_one_publishes() {
        let (poller, _) = counting_poller();
        settle().await;

        for _ in 0..5 {
            time::advance(INTERVAL).await;
            settle().await;
        }

        assert_eq!(poller.publish_count(), 6);
        assert_eq!(poller.latest().as_deref(), Some(&6));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_fetch_between_ticks() {
        let (poller, calls) = counting_poller();
        settle().await;

        time::advance(INTERVAL - Duration::from_millis(1)).await;
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(poller.publish_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_published_after_stop() {
        let (poller, calls) = counting_poller();
        settle().await;
        poller.stop();

        for _ in 0..5 {
            time::advance(INTERVAL).await;
            settle().await;
        }

        assert_eq!(poller.publish_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!poller.is_active());
        // The last good value is still readable.
        assert_eq!(poller.latest().as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_is_dropped_after_stop() {
        let gate = Arc::new(Notify::new());
        let release = gate.clone();
        let poller = DataPoller::spawn("gated", INTERVAL, CancellationToken::new(), move || {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok::<_, String>(42u32)
            }
        });
        settle().await;

        poller.stop();
        release.notify_one();
        settle().await;

        assert_eq!(poller.latest(), None);
        assert_eq!(poller.publish_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let poller = DataPoller::spawn("flaky", INTERVAL, CancellationToken::new(), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Ok("first".to_string()),
                    1 => Err("connection refused"),
                    _ => Ok("third".to_string()),
                }
            }
        });
        settle().await;
        assert_eq!(poller.latest().as_deref().map(String::as_str), Some("first"));

        time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(poller.latest().as_deref().map(String::as_str), Some("first"));
        assert_eq!(poller.publish_count(), 1);
        assert_eq!(poller.last_error().as_deref(), Some("connection refused"));
        assert!(poller.is_active());

        time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(poller.latest().as_deref().map(String::as_str), Some("third"));
        assert_eq!(poller.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_before_first_success_publishes_nothing() {
        let poller = DataPoller::spawn("down", INTERVAL, CancellationToken::new(), || async {
            Err::<u8, _>("503 Service Unavailable")
        });
        settle().await;

        assert_eq!(poller.latest(), None);
        assert_eq!(poller.publish_count(), 0);
        assert!(poller.last_error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_never_overlap() {
        let in_flight = Arc::new(AtomicU32::new(0));
        let max_in_flight = Arc::new(AtomicU32::new(0));
        let seq = Arc::new(AtomicU64::new(0));

        let (a, b, c) = (in_flight.clone(), max_in_flight.clone(), seq.clone());
        let poller = DataPoller::spawn("slow", INTERVAL, CancellationToken::new(), move || {
            let (in_flight, max_in_flight, seq) = (a.clone(), b.clone(), c.clone());
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_secs(15)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(seq.fetch_add(1, Ordering::SeqCst))
            }
        });

        let mut last_seen = None;
        for _ in 0..90 {
            time::advance(Duration::from_secs(1)).await;
            settle().await;
            let latest = poller.latest().map(|v| *v);
            assert!(latest >= last_seen, "publishes went backwards");
            last_seen = latest;
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert!(poller.publish_count() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_the_task() {
        let parent = CancellationToken::new();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let poller = DataPoller::spawn("child", INTERVAL, parent.child_token(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(()) }
        });
        settle().await;

        parent.cancel();
        time::advance(INTERVAL * 3).await;
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn drop_deactivates() {
        let (poller, calls) = counting_poller();
        let rx = poller.subscribe();
        settle().await;
        drop(poller);

        time::advance(INTERVAL * 3).await;
        settle().await;

        assert!(!rx.borrow().is_active());
        assert_eq!(rx.borrow().publishes(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_resolves_on_next_publish() {
        let (poller, _) = counting_poller();
        settle().await;

        let wait = poller.changed();
        tokio::pin!(wait);
        assert!(futures::poll!(wait.as_mut()).is_pending());

        time::advance(INTERVAL).await;
        wait.await;
        assert_eq!(poller.publish_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn held_receiver_sees_publish_between_waits() {
        let (poller, _) = counting_poller();
        let mut rx = poller.subscribe();
        settle().await;
        let _ = rx.borrow_and_update();

        time::advance(INTERVAL).await;
        settle().await;

        // Published while nobody was waiting; a held receiver still has it.
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().publishes(), 2);

        let wait = poller.changed();
        tokio::pin!(wait);
        assert!(futures::poll!(wait.as_mut()).is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn page_updates_wake_on_publish() {
        let (poller, _) = counting_poller();
        let mut updates = PageUpdates::new().with(&poller);
        settle().await;

        assert!(updates.next().await);
        assert_eq!(poller.publish_count(), 1);
    }
}
