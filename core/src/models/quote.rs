use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest price quote for a single instrument.
///
/// Produced by a fetcher or restored from a snapshot store. A quote is never
/// mutated after construction; every refresh cycle yields a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, e.g. "AAPL".
    pub symbol: String,
    /// Human readable instrument name.
    pub name: String,

    pub price: f64,
    /// Absolute change since previous close.
    pub change: f64,
    /// Percent change since previous close.
    pub change_percent: f64,

    // Descriptive fields, all optional on the wire
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

    /// Time the upstream source stamped this quote.
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            change,
            change_percent,
            exchange: None,
            currency: None,
            day_low: None,
            day_high: None,
            year_low: None,
            year_high: None,
            open: None,
            previous_close: None,
            volume: None,
            quoted_at: Utc::now(),
        }
    }

    /// Tags attached to a "fetched" event for this quote.
    pub fn event_tags(&self) -> HashMap<String, String> {
        HashMap::from([
            ("symbol".to_string(), self.symbol.clone()),
            ("price".to_string(), self.price.to_string()),
            ("change_percent".to_string(), self.change_percent.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tags_carry_price_and_change() {
        let q = Quote::new("AAPL", "Apple Inc.", 189.5, 1.25, 0.66);
        let tags = q.event_tags();

        assert_eq!(tags.get("price").map(String::as_str), Some("189.5"));
        assert_eq!(tags.get("change_percent").map(String::as_str), Some("0.66"));
        assert_eq!(tags.get("symbol").map(String::as_str), Some("AAPL"));
    }

    #[test]
    fn missing_descriptive_fields_default_to_none() {
        let raw = r#"{
            "symbol": "MSFT",
            "name": "Microsoft",
            "price": 410.0,
            "change": -2.0,
            "change_percent": -0.48,
            "quoted_at": "2024-05-01T14:30:00Z"
        }"#;

        let q: Quote = serde_json::from_str(raw).unwrap();
        assert_eq!(q.symbol, "MSFT");
        assert!(q.exchange.is_none());
        assert!(q.volume.is_none());
    }
}
