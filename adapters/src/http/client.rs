use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use corelib::{FetchError, Quote};
use engine::QuoteFetcher;

use crate::http::errors::HttpError;
use crate::http::types::QuoteResponse;

/// Placeholder substituted with the configured symbol.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Fetches one quote per call from a JSON HTTP endpoint.
#[derive(Clone)]
pub struct HttpQuoteFetcher {
    http: Client,
    url: String,
}

impl HttpQuoteFetcher {
    /// `url` may contain `{symbol}`, which is replaced by `symbol`.
    pub fn new(url: &str, symbol: &str, timeout: Duration) -> Result<Self, HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::EmptyUrl);
        }

        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.replace(SYMBOL_PLACEHOLDER, symbol),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteFetcher for HttpQuoteFetcher {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_once(&self) -> Result<Quote, FetchError> {
        let resp = self.http.get(&self.url).send().await.map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(transport)?;

        let decoded: QuoteResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let quote: Quote = decoded.into_first().ok_or(FetchError::Empty)?.into();

        debug!(
            symbol = %quote.symbol,
            price = quote.price,
            change_percent = quote.change_percent,
            "quote fetched"
        );

        Ok(quote)
    }
}

fn transport(e: reqwest::Error) -> FetchError {
    if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
