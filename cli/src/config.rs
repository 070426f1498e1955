use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_QUOTE_URL: &str = "https://financialmodelingprep.com/api/v3/quote/{symbol}";
pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://quote_refresh.db?mode=rwc";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Quote endpoint. `{symbol}` is substituted with `symbol`.
    pub quote_url: String,
    pub symbol: String,

    /// Delay between the end of one poll cycle and the start of the next.
    pub poll_interval: Duration,
    /// Per-request budget for the upstream quote API.
    pub http_timeout: Duration,

    /// Snapshot database. Ignored when `memory_store` is set.
    pub database_url: String,
    /// Keep the last-known quote in process memory only.
    pub memory_store: bool,

    /// JSON log lines instead of pretty output.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let millis = |key: &str, default: u64| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("{key} must be a whole number of milliseconds, got {raw:?}")),
                None => Ok(Duration::from_millis(default)),
            }
        };

        Ok(Self {
            quote_url: lookup("QUOTE_URL").unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            symbol: lookup("QUOTE_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),

            // Upstream free tiers are rate limited; once a minute is plenty.
            poll_interval: millis("POLL_INTERVAL_MS", 60_000)?,
            http_timeout: millis("HTTP_TIMEOUT_MS", 5_000)?,

            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            memory_store: false,

            json_logs: lookup("APP_ENV").as_deref() == Some("production"),
        })
    }
}
