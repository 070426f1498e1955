use chrono::{DateTime, Utc};
use serde::Deserialize;

use corelib::Quote;

/// Quote endpoints answer with either a bare object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QuoteResponse {
    Many(Vec<QuotePayload>),
    One(QuotePayload),
}

impl QuoteResponse {
    pub fn into_first(self) -> Option<QuotePayload> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

/// Wire shape of a single quote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,

    pub price: f64,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(alias = "changesPercentage", alias = "changePercentage")]
    pub change_percent: f64,

    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub year_low: Option<f64>,
    #[serde(default)]
    pub year_high: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,

    /// Unix seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl From<QuotePayload> for Quote {
    fn from(p: QuotePayload) -> Self {
        let change = p
            .change
            .or_else(|| p.previous_close.map(|prev| p.price - prev))
            .unwrap_or(0.0);

        let quoted_at = p
            .timestamp
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Quote {
            name: p.name.unwrap_or_else(|| p.symbol.clone()),
            symbol: p.symbol,
            price: p.price,
            change,
            change_percent: p.change_percent,
            exchange: p.exchange,
            currency: p.currency,
            day_low: p.day_low,
            day_high: p.day_high,
            year_low: p.year_low,
            year_high: p.year_high,
            open: p.open,
            previous_close: p.previous_close,
            volume: p.volume,
            quoted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_array_form_with_legacy_percent_field() {
        let raw = r#"[{
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 189.84,
            "changesPercentage": 0.6149,
            "change": 1.16,
            "dayLow": 187.45,
            "dayHigh": 190.0,
            "yearHigh": 199.62,
            "yearLow": 164.08,
            "volume": 53512376,
            "exchange": "NASDAQ",
            "open": 188.5,
            "previousClose": 188.68,
            "timestamp": 1714579200
        }]"#;

        let resp: QuoteResponse = serde_json::from_str(raw).unwrap();
        let q: Quote = resp.into_first().unwrap().into();

        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.change_percent, 0.6149);
        assert_eq!(q.day_low, Some(187.45));
        assert_eq!(q.volume, Some(53_512_376));
        assert_eq!(q.exchange.as_deref(), Some("NASDAQ"));
        assert_eq!(q.quoted_at.timestamp(), 1_714_579_200);
    }

    #[test]
    fn missing_change_is_derived_from_previous_close() {
        let raw = r#"{"symbol": "MSFT", "price": 410.5, "changePercent": 0.5, "previousClose": 408.5}"#;

        let resp: QuoteResponse = serde_json::from_str(raw).unwrap();
        let q: Quote = resp.into_first().unwrap().into();

        assert_eq!(q.name, "MSFT");
        assert_eq!(q.change, 2.0);
    }

    #[test]
    fn empty_array_has_no_quote() {
        let resp: QuoteResponse = serde_json::from_str("[]").unwrap();
        assert!(resp.into_first().is_none());
    }

    #[test]
    fn missing_price_fails_to_decode() {
        let raw = r#"{"symbol": "AAPL", "changePercent": 0.1}"#;
        assert!(serde_json::from_str::<QuoteResponse>(raw).is_err());
    }
}
