mod cli;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use adapters::events::{EventLog, FanoutRecorder, TracingRecorder};
use adapters::http::HttpQuoteFetcher;
use adapters::store::{MemorySnapshotStore, SqlSnapshotStore, sql::DEFAULT_SNAPSHOT_KEY};
use common::logger::init_tracing;
use corelib::{Quote, events};
use engine::{RefreshEngine, SnapshotStore, Subscription};

use crate::cli::Cli;
use crate::config::AppConfig;

async fn build_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    if cfg.memory_store {
        info!("using in-memory snapshot store");
        return Ok(Arc::new(MemorySnapshotStore::new()));
    }

    let store = SqlSnapshotStore::connect(&cfg.database_url, DEFAULT_SNAPSHOT_KEY)
        .await
        .context("open snapshot store")?;

    info!(database_url = %cfg.database_url, "snapshot store ready");
    Ok(Arc::new(store))
}

fn log_quote(q: &Quote) {
    info!(
        symbol = %q.symbol,
        price = q.price,
        change = q.change,
        change_percent = q.change_percent,
        quoted_at = %q.quoted_at,
        "quote"
    );
}

/// Drain the subscription until it closes. Returns the terminal error, if any.
async fn consume(mut sub: Subscription) -> Option<corelib::FetchError> {
    while let Some(delivery) = sub.recv().await {
        match delivery {
            Ok(quote) => log_quote(&quote),
            Err(e) => error!(error = %e, "quote feed failed"),
        }
    }
    sub.last_error().cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Cli::parse().apply(AppConfig::from_env()?);

    init_tracing("quote-refresh", cfg.json_logs);

    info!(
        symbol = %cfg.symbol,
        every = ?cfg.poll_interval,
        "starting quote refresh"
    );

    let fetcher = HttpQuoteFetcher::new(&cfg.quote_url, &cfg.symbol, cfg.http_timeout)
        .context("build quote fetcher")?;
    let store = build_store(&cfg).await?;

    let log = EventLog::new();
    let recorder = FanoutRecorder::new()
        .with(Arc::new(TracingRecorder))
        .with(Arc::new(log.clone()));

    let engine = RefreshEngine::new(Arc::new(fetcher), store, Arc::new(recorder));

    let sub = engine.subscribe().await;
    let feed = tokio::spawn(consume(sub));

    engine.start_fetching(cfg.poll_interval);

    let outcome = tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("listen for ctrl-c")?;
            info!("shutdown requested");
            None
        }
        res = feed => res.context("quote feed task panicked")?,
    };

    engine.stop_fetching();

    info!(fetched = log.count(events::FETCHED), "quote refresh stopped");

    match outcome {
        Some(e) => {
            warn!(error = %e, "exiting after terminal fetch failure");
            Err(e.into())
        }
        None => Ok(()),
    }
}
