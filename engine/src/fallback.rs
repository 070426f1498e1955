//! Fetch-with-fallback policy.
//!
//! A live fetch wins. When it fails, the last persisted snapshot stands in for
//! it and subscribers cannot tell the difference. Only when both are missing
//! does the original fetch error surface.
//!
//! The side effects of a live quote (the "fetched" event and the snapshot
//! write) live in [`commit_live`], which the poll loop runs only after the
//! quote has been fanned out. A subscriber that replays the new snapshot can
//! therefore never also be in the registry for that cycle's broadcast.

use std::time::Duration;

use common::logger::warn_if_slow;
use corelib::{FetchError, Quote, events};
use tracing::{debug, instrument, warn};

use crate::ports::{EventRecorder, QuoteFetcher, SnapshotStore};

const FETCH_BUDGET: Duration = Duration::from_secs(2);
const STORE_BUDGET: Duration = Duration::from_millis(200);

/// Where a cycle's quote came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleQuote {
    /// Fresh from the fetcher.
    Live(Quote),
    /// Last persisted snapshot standing in for a failed fetch.
    Cached(Quote),
}

impl CycleQuote {
    pub fn quote(&self) -> &Quote {
        match self {
            Self::Live(q) | Self::Cached(q) => q,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn into_quote(self) -> Quote {
        match self {
            Self::Live(q) | Self::Cached(q) => q,
        }
    }
}

/// Run one fetch for a poll cycle. Has no side effects beyond reading the
/// snapshot on failure.
#[instrument(skip_all, target = "refresh")]
pub async fn fetch_with_fallback(
    fetcher: &dyn QuoteFetcher,
    store: &dyn SnapshotStore,
) -> Result<CycleQuote, FetchError> {
    let fetched = warn_if_slow("quote_fetch", FETCH_BUDGET, fetcher.fetch_once()).await;

    match fetched {
        Ok(quote) => {
            debug!(
                symbol = %quote.symbol,
                price = quote.price,
                change_percent = quote.change_percent,
                "live quote fetched"
            );
            Ok(CycleQuote::Live(quote))
        }
        Err(err) => match load_snapshot(store).await {
            Some(cached) => {
                warn!(
                    error = %err,
                    symbol = %cached.symbol,
                    "fetch failed; serving cached quote"
                );
                Ok(CycleQuote::Cached(cached))
            }
            None => {
                warn!(error = %err, "fetch failed and no cached quote is available");
                Err(err)
            }
        },
    }
}

/// Record a live quote as "fetched", then persist it. Both are best-effort.
pub async fn commit_live(store: &dyn SnapshotStore, recorder: &dyn EventRecorder, quote: &Quote) {
    recorder.record(events::FETCHED, quote.event_tags());
    persist_snapshot(store, quote).await;
}

/// Load the last persisted quote. Read failures count as "nothing cached".
pub async fn load_snapshot(store: &dyn SnapshotStore) -> Option<Quote> {
    match warn_if_slow("snapshot_load", STORE_BUDGET, store.load()).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = ?e, "snapshot load failed; treating as empty");
            None
        }
    }
}

/// Persist a quote, logging instead of propagating failures.
pub async fn persist_snapshot(store: &dyn SnapshotStore, quote: &Quote) {
    if let Err(e) = warn_if_slow("snapshot_save", STORE_BUDGET, store.save(quote)).await {
        warn!(error = ?e, symbol = %quote.symbol, "snapshot save failed");
    }
}
