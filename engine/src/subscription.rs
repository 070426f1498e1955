use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use corelib::{FetchError, Quote};
use futures::Stream;
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};
use uuid::Uuid;

use crate::refresh::EngineInner;

/// A single item delivered to a subscriber. An `Err` is terminal.
pub type Delivery = Result<Quote, FetchError>;

/// Opaque registry key. Carries no business meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-side end of a subscription.
///
/// Yields quotes until the caller drops it (or calls [`Subscription::cancel`])
/// or the engine delivers a terminal error. Dropping unregisters it from the
/// engine; if it was the last one, the poll loop stops.
pub struct Subscription {
    id: SubscriptionId,
    rx: UnboundedReceiver<Delivery>,
    engine: Arc<EngineInner>,
    last_error: Option<FetchError>,
    closed: bool,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        rx: UnboundedReceiver<Delivery>,
        engine: Arc<EngineInner>,
    ) -> Self {
        Self {
            id,
            rx,
            engine,
            last_error: None,
            closed: false,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next delivery. `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<Delivery> {
        if self.closed {
            return None;
        }
        let item = self.rx.recv().await;
        self.observe(item)
    }

    /// Non-blocking variant of [`Subscription::recv`]. `None` if nothing is
    /// queued right now or the subscription is closed.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(item) => self.observe(Some(item)),
            Err(TryRecvError::Disconnected) => self.observe(None),
            Err(TryRecvError::Empty) => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The terminal error, once one has been received.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Stop receiving. Same as dropping the subscription.
    pub fn cancel(self) {}

    fn observe(&mut self, item: Option<Delivery>) -> Option<Delivery> {
        match &item {
            Some(Err(err)) => {
                self.last_error = Some(err.clone());
                self.closed = true;
            }
            None => self.closed = true,
            Some(Ok(_)) => {}
        }
        item
    }
}

impl Stream for Subscription {
    type Item = Delivery;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(item) => Poll::Ready(this.observe(item)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.engine.unsubscribe(&self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.closed)
            .field("last_error", &self.last_error)
            .finish()
    }
}
