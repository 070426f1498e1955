use std::time::Duration;

use clap::Parser;

use crate::config::AppConfig;

/// Command-line overrides. Anything left unset keeps its environment value.
#[derive(Debug, Parser)]
#[clap(name = "quote-refresh", version)]
pub struct Cli {
    /// Ticker symbol to poll
    #[clap(long)]
    pub symbol: Option<String>,

    /// Quote endpoint; `{symbol}` is replaced with the symbol
    #[clap(long)]
    pub url: Option<String>,

    /// Delay between poll cycles, in milliseconds
    #[clap(long)]
    pub interval_ms: Option<u64>,

    /// Snapshot database URL
    #[clap(long, conflicts_with = "memory_store")]
    pub database_url: Option<String>,

    /// Keep the last-known quote in memory instead of a database
    #[clap(long)]
    pub memory_store: bool,

    /// Emit JSON log lines
    #[clap(long)]
    pub json_logs: bool,
}

impl Cli {
    pub fn apply(self, mut cfg: AppConfig) -> AppConfig {
        if let Some(symbol) = self.symbol {
            cfg.symbol = symbol;
        }
        if let Some(url) = self.url {
            cfg.quote_url = url;
        }
        if let Some(ms) = self.interval_ms {
            cfg.poll_interval = Duration::from_millis(ms);
        }
        if let Some(db) = self.database_url {
            cfg.database_url = db;
        }

        cfg.memory_store |= self.memory_store;
        cfg.json_logs |= self.json_logs;
        cfg
    }
}
