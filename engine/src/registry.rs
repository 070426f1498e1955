use std::collections::HashMap;

use corelib::{FetchError, Quote};
use tokio::sync::mpsc::UnboundedSender;

use crate::subscription::{Delivery, SubscriptionId};

/// Open subscriptions, keyed by their opaque id.
///
/// Owned by the engine and only touched while the engine lock is held.
/// Sending on an unbounded channel never suspends, so a whole fan-out runs
/// under the lock against one point-in-time view of the registry.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<SubscriptionId, UnboundedSender<Delivery>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: SubscriptionId, sender: UnboundedSender<Delivery>) {
        self.subscribers.insert(id, sender);
    }

    /// Returns true if the id was registered.
    pub fn remove(&mut self, id: &SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Push one quote to every subscriber. Receivers that are already gone
    /// are pruned. Returns how many subscribers got the quote.
    pub fn broadcast(&mut self, quote: &Quote) -> usize {
        let mut delivered = 0;

        self.subscribers.retain(|_, tx| {
            if tx.send(Ok(quote.clone())).is_ok() {
                delivered += 1;
                true
            } else {
                false
            }
        });

        delivered
    }

    /// Deliver a terminal error to every subscriber and empty the registry.
    /// Dropping the senders closes each stream right after the error.
    pub fn fail_all(&mut self, err: &FetchError) -> usize {
        let mut delivered = 0;

        for (_, tx) in self.subscribers.drain() {
            if tx.send(Err(err.clone())).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }
}
