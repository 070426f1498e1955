use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adapters::http::HttpQuoteFetcher;
use corelib::FetchError;
use engine::QuoteFetcher;

const TIMEOUT: Duration = Duration::from_secs(2);

fn fetcher_for(server: &MockServer) -> HttpQuoteFetcher {
    let url = format!("{}/v3/quote/{{symbol}}", server.uri());
    HttpQuoteFetcher::new(&url, "AAPL", TIMEOUT).expect("build fetcher")
}

#[tokio::test]
async fn decodes_quote_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 189.84,
            "changesPercentage": 0.61,
            "change": 1.16,
            "exchange": "NASDAQ"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let quote = fetcher_for(&server).fetch_once().await.unwrap();

    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, 189.84);
    assert_eq!(quote.change_percent, 0.61);
    assert_eq!(quote.exchange.as_deref(), Some("NASDAQ"));
}

#[tokio::test]
async fn decodes_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "AAPL",
            "price": 190.0,
            "changePercent": -0.2
        })))
        .mount(&server)
        .await;

    let quote = fetcher_for(&server).fetch_once().await.unwrap();

    assert_eq!(quote.price, 190.0);
    assert_eq!(quote.change_percent, -0.2);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_once().await.unwrap_err();
    assert_eq!(err, FetchError::Status(503));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_once().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_list_is_reported_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_once().await.unwrap_err();
    assert_eq!(err, FetchError::Empty);
}

#[tokio::test]
async fn slow_upstream_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"symbol": "AAPL", "price": 1.0, "changePercent": 0.0}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/quote", server.uri());
    let fetcher = HttpQuoteFetcher::new(&url, "AAPL", Duration::from_millis(50)).unwrap();

    let err = fetcher.fetch_once().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Port 9 (discard) on localhost is closed on test machines.
    let fetcher = HttpQuoteFetcher::new("http://127.0.0.1:9/quote", "AAPL", TIMEOUT).unwrap();

    let err = fetcher.fetch_once().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}
