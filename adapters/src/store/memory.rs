use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use corelib::Quote;
use engine::SnapshotStore;

/// Process-local snapshot store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<Option<Quote>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out holding `quote`, as if it had been saved earlier.
    pub fn with_quote(quote: Quote) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(quote))),
        }
    }

    pub async fn get(&self) -> Option<Quote> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, quote: &Quote) -> anyhow::Result<()> {
        let mut g = self.inner.write().await;
        *g = Some(quote.clone());
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Quote>> {
        Ok(self.get().await)
    }
}
