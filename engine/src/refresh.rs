//! RefreshEngine owns the subscriber registry and the poll loop lifecycle.
//!
//! Each new subscriber gets the cached quote replayed to it exactly once. At
//! most one poll loop runs at a time, and every cycle's result is fanned out
//! to all subscribers before the quote is recorded and persisted. When nothing
//! can be served, every subscription is closed with the error. Polling stops
//! once the last subscriber leaves.
//!
//! All mutable state sits behind a single lock that is never held across an
//! await: fetches, snapshot I/O and the inter-cycle sleep all run unlocked, so
//! subscribe/unsubscribe stay responsive while a cycle is in flight.

use std::sync::Arc;
use std::time::Duration;

use corelib::{FetchError, Quote};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::fallback::{CycleQuote, commit_live, fetch_with_fallback, load_snapshot};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::ports::{EventRecorder, QuoteFetcher, SnapshotStore};
use crate::registry::SubscriberRegistry;
use crate::subscription::{Subscription, SubscriptionId};

/// Cheap-to-clone handle on a refresh engine. All clones share one registry
/// and one poll loop.
#[derive(Clone)]
pub struct RefreshEngine {
    inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    fetcher: Arc<dyn QuoteFetcher>,
    store: Arc<dyn SnapshotStore>,
    recorder: Arc<dyn EventRecorder>,

    state: Mutex<EngineState>,
    /// Mirrors `state.lifecycle.phase()` for async observers.
    phase_tx: watch::Sender<Lifecycle>,
}

#[derive(Default)]
struct EngineState {
    lifecycle: LifecycleState,
    registry: SubscriberRegistry,
}

impl RefreshEngine {
    pub fn new(
        fetcher: Arc<dyn QuoteFetcher>,
        store: Arc<dyn SnapshotStore>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(Lifecycle::Idle);

        Self {
            inner: Arc::new(EngineInner {
                fetcher,
                store,
                recorder,
                state: Mutex::new(EngineState::default()),
                phase_tx,
            }),
        }
    }

    /// Open a new subscription.
    ///
    /// The cached quote, if any, is queued on the new subscription before it
    /// joins the registry. Any fan-out that can reach this subscriber therefore
    /// lands behind the replay. Never fails.
    #[instrument(skip(self), target = "refresh")]
    pub async fn subscribe(&self) -> Subscription {
        let id = SubscriptionId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(cached) = load_snapshot(self.inner.store.as_ref()).await {
            debug!(subscription_id = %id, symbol = %cached.symbol, "replaying cached quote");
            let _ = tx.send(Ok(cached));
        }

        let count = {
            let mut st = self.inner.state.lock();
            st.registry.insert(id, tx);
            st.registry.len()
        };

        info!(subscription_id = %id, subscribers = count, "subscription opened");

        Subscription::new(id, rx, Arc::clone(&self.inner))
    }

    /// Start polling every `interval`.
    ///
    /// No-op when a loop is already running (the first interval keeps
    /// governing) or when nobody is subscribed. Must be called from within a
    /// tokio runtime.
    pub fn start_fetching(&self, interval: Duration) {
        if interval.is_zero() {
            warn!(target: "refresh", "ignoring start with zero poll interval");
            return;
        }

        let (generation, cancel) = {
            let mut st = self.inner.state.lock();

            if st.registry.is_empty() {
                warn!(target: "refresh", every = ?interval, "no subscribers; start ignored");
                return;
            }

            let Some(started) = st.lifecycle.begin(interval) else {
                info!(
                    target: "refresh",
                    running_every = ?st.lifecycle.interval(),
                    requested_every = ?interval,
                    "poll loop already running; start ignored"
                );
                return;
            };

            self.inner.publish(st.lifecycle.phase());
            started
        };

        let span = tracing::info_span!("poll_loop", generation, every = ?interval);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run_poll_loop(generation, interval, cancel).instrument(span));
    }

    /// Signal the poll loop to stop. Safe to call when idle.
    pub fn stop_fetching(&self) {
        let mut st = self.inner.state.lock();

        if st.lifecycle.request_stop() {
            self.inner.publish(st.lifecycle.phase());
            info!(target: "refresh", "poll loop stop requested");
        } else {
            debug!(target: "refresh", phase = ?st.lifecycle.phase(), "stop ignored; no running loop");
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.inner.state.lock().lifecycle.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state() == Lifecycle::Running
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().registry.len()
    }

    /// Observe lifecycle transitions.
    pub fn watch_state(&self) -> watch::Receiver<Lifecycle> {
        self.inner.phase_tx.subscribe()
    }
}

impl EngineInner {
    fn publish(&self, phase: Lifecycle) {
        self.phase_tx.send_replace(phase);
    }

    /// Remove a subscription. Stops the loop when the registry empties.
    pub(crate) fn unsubscribe(&self, id: &SubscriptionId) {
        let mut st = self.state.lock();

        if !st.registry.remove(id) {
            // Already removed by a terminal delivery.
            return;
        }

        debug!(target: "refresh", subscription_id = %id, remaining = st.registry.len(), "subscription closed");

        if st.registry.is_empty() && st.lifecycle.request_stop() {
            self.publish(st.lifecycle.phase());
            info!(target: "refresh", "last subscriber left; stopping poll loop");
        }
    }

    async fn run_poll_loop(
        self: Arc<Self>,
        generation: u64,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        info!("poll loop started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let outcome = fetch_with_fallback(self.fetcher.as_ref(), self.store.as_ref()).await;

            match outcome {
                Ok(cycle) => {
                    if !self.deliver(generation, cycle.quote()) {
                        break;
                    }
                    // Only after fan-out: a subscriber that replays this
                    // snapshot must not also be in the broadcast.
                    if let CycleQuote::Live(quote) = &cycle {
                        commit_live(self.store.as_ref(), self.recorder.as_ref(), quote).await;
                    }
                }
                Err(err) => {
                    self.terminate(generation, err);
                    return;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.finish(generation);
    }

    /// Fan a quote out to the current registry. Returns false, delivering
    /// nothing, if this loop was cancelled while the fetch was in flight.
    fn deliver(&self, generation: u64, quote: &Quote) -> bool {
        let mut st = self.state.lock();

        if !st.lifecycle.is_current(generation) {
            debug!("cancelled during fetch; dropping result");
            return false;
        }

        let delivered = st.registry.broadcast(quote);
        debug!(
            delivered,
            symbol = %quote.symbol,
            price = quote.price,
            "quote broadcast"
        );
        true
    }

    /// Unrecoverable failure: close every subscription with `err` and go idle.
    fn terminate(&self, generation: u64, err: FetchError) {
        let mut st = self.state.lock();

        if st.lifecycle.is_current(generation) {
            let notified = st.registry.fail_all(&err);
            error!(error = %err, notified, "no quote available; poll loop terminated");
        } else {
            debug!(error = %err, "cancelled during fetch; error not delivered");
        }

        if st.lifecycle.finish(generation) {
            self.publish(st.lifecycle.phase());
        }
    }

    fn finish(&self, generation: u64) {
        let mut st = self.state.lock();

        if st.lifecycle.finish(generation) {
            self.publish(st.lifecycle.phase());
        }
        info!("poll loop exited");
    }
}
