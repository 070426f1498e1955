//! Quote refresh engine.
//!
//! Polls a single remote quote on a fixed cadence, fans every result out to
//! the open subscriptions and falls back to the last persisted snapshot when
//! the remote side is unavailable.

pub mod fallback;
pub mod lifecycle;
pub mod ports;
pub mod refresh;
pub mod registry;
pub mod subscription;

pub use lifecycle::Lifecycle;
pub use ports::{EventRecorder, QuoteFetcher, SnapshotStore};
pub use refresh::RefreshEngine;
pub use subscription::{Delivery, Subscription, SubscriptionId};
