use anyhow::Context;
use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use tracing::{debug, instrument};

use corelib::{Quote, time::now_ms};
use engine::SnapshotStore;

use crate::store::schema;

/// Key the latest quote is stored under unless configured otherwise.
pub const DEFAULT_SNAPSHOT_KEY: &str = "latest_quote";

/// SQLx-backed snapshot store.
///
/// Keeps one JSON-encoded quote per key. Responsible only for persistence;
/// the engine decides what a failed load means.
#[derive(Clone)]
pub struct SqlSnapshotStore {
    pool: AnyPool,
    key: String,
}

impl SqlSnapshotStore {
    pub fn new(pool: AnyPool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }

    /// Open a pool for `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str, key: impl Into<String>) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await
            .with_context(|| format!("failed to connect to {database_url}"))?;

        let store = Self::new(pool, key);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        schema::migrate(&self.pool).await
    }

    /// When the stored quote was last written, if ever.
    pub async fn last_saved_ms(&self) -> anyhow::Result<Option<u64>> {
        let row = sqlx::query("SELECT saved_ms FROM snapshots WHERE snapshot_key = ?;")
            .bind(self.key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let saved: i64 = r.try_get("saved_ms")?;
                Ok(Some(u64::try_from(saved).context("negative saved_ms")?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for SqlSnapshotStore {
    #[instrument(skip(self, quote), target = "store", fields(key = %self.key, symbol = %quote.symbol))]
    async fn save(&self, quote: &Quote) -> anyhow::Result<()> {
        let payload = serde_json::to_string(quote).context("encode snapshot")?;
        let saved_ms = i64::try_from(now_ms()).context("saved_ms out of range")?;

        sqlx::query(
            r#"
INSERT INTO snapshots (snapshot_key, payload, saved_ms)
VALUES (?, ?, ?)
ON CONFLICT(snapshot_key) DO UPDATE SET
  payload = excluded.payload,
  saved_ms = excluded.saved_ms;
"#,
        )
        .bind(self.key.as_str())
        .bind(payload)
        .bind(saved_ms)
        .execute(&self.pool)
        .await
        .context("upsert snapshot")?;

        debug!("snapshot saved");
        Ok(())
    }

    #[instrument(skip(self), target = "store", fields(key = %self.key))]
    async fn load(&self) -> anyhow::Result<Option<Quote>> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE snapshot_key = ?;")
            .bind(self.key.as_str())
            .fetch_optional(&self.pool)
            .await
            .context("select snapshot")?;

        let Some(r) = row else {
            debug!("no snapshot stored");
            return Ok(None);
        };

        let payload: String = r.try_get("payload")?;
        let quote = serde_json::from_str(&payload).context("corrupt snapshot payload")?;

        Ok(Some(quote))
    }
}
