use std::collections::HashMap;

use async_trait::async_trait;
use corelib::{FetchError, Quote};

/// One network round trip to the quote source.
#[async_trait]
pub trait QuoteFetcher: Send + Sync + 'static {
    async fn fetch_once(&self) -> Result<Quote, FetchError>;
}

/// Durable home of the last known-good quote.
///
/// Errors are only ever logged by the engine; a failed `load` counts as
/// "nothing cached".
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    async fn save(&self, quote: &Quote) -> anyhow::Result<()>;

    async fn load(&self) -> anyhow::Result<Option<Quote>>;
}

/// Fire-and-forget analytics sink. Implementations must not block.
pub trait EventRecorder: Send + Sync + 'static {
    fn record(&self, name: &str, tags: HashMap<String, String>);
}
