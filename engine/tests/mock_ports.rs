#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use corelib::{FetchError, Quote};
use engine::{EventRecorder, QuoteFetcher, SnapshotStore};

/// Fetcher that replays a script, then repeats its last entry forever.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Quote, FetchError>>>,
    last: Mutex<Result<Quote, FetchError>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn always(result: Result<Quote, FetchError>) -> Arc<Self> {
        Self::sequence(Vec::new(), result)
    }

    pub fn sequence(
        script: Vec<Result<Quote, FetchError>>,
        then: Result<Quote, FetchError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(then),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteFetcher for ScriptedFetcher {
    async fn fetch_once(&self) -> Result<Quote, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(next) => next,
            None => self.last.lock().clone(),
        }
    }
}

/// Fetcher that parks inside `fetch_once` until released.
pub struct GatedFetcher {
    pub entered: Notify,
    pub release: Notify,
    quote: Quote,
}

impl GatedFetcher {
    pub fn new(quote: Quote) -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            quote,
        })
    }
}

#[async_trait]
impl QuoteFetcher for GatedFetcher {
    async fn fetch_once(&self) -> Result<Quote, FetchError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.quote.clone())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    slot: Mutex<Option<Quote>>,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding(quote: Quote) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Some(quote)),
            saves: AtomicUsize::new(0),
        })
    }

    pub fn current(&self) -> Option<Quote> {
        self.slot.lock().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn save(&self, quote: &Quote) -> anyhow::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock() = Some(quote.clone());
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Quote>> {
        Ok(self.slot.lock().clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, HashMap<String, String>)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|(n, _)| n == name).count()
    }

    pub fn last_tags(&self) -> Option<HashMap<String, String>> {
        self.events.lock().last().map(|(_, tags)| tags.clone())
    }
}

impl EventRecorder for RecordingSink {
    fn record(&self, name: &str, tags: HashMap<String, String>) {
        self.events.lock().push((name.to_string(), tags));
    }
}

pub fn quote(symbol: &str, price: f64) -> Quote {
    Quote::new(symbol, format!("{symbol} Corp"), price, 1.5, 0.75)
}

/// Store whose `save` lands the write immediately but takes `linger` to
/// return, like a database acknowledging a commit late.
pub struct LingeringSaveStore {
    slot: Mutex<Option<Quote>>,
    linger: std::time::Duration,
}

impl LingeringSaveStore {
    pub fn new(linger: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            linger,
        })
    }
}

#[async_trait]
impl SnapshotStore for LingeringSaveStore {
    async fn save(&self, quote: &Quote) -> anyhow::Result<()> {
        *self.slot.lock() = Some(quote.clone());
        tokio::time::sleep(self.linger).await;
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Quote>> {
        Ok(self.slot.lock().clone())
    }
}
