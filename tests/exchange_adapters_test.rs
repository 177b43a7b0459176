use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use FundingInfra::config::exchange::{ExchangeConfig, ExchangeKind};
use FundingInfra::error::Error;
use FundingInfra::exchange::{Exchange, HistoryMode, Hyperliquid, KucoinFutures};
use FundingInfra::types::symbol::Symbol;

fn config(kind: ExchangeKind, server: &MockServer) -> ExchangeConfig {
    ExchangeConfig {
        kind,
        base_url: Some(server.uri()),
        request_timeout_ms: 2_000,
        ..ExchangeConfig::default()
    }
}

fn kucoin_ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": "200000", "data": data }))
}

#[tokio::test]
async fn kucoin_lists_open_perpetuals_and_scales_book_by_multiplier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/contracts/active"))
        .respond_with(kucoin_ok(json!([
            { "symbol": "XBTUSDTM", "type": "FFWCSX", "status": "Open", "multiplier": 0.001 },
            { "symbol": "XBTMZ25", "type": "FFICSX", "status": "Open", "multiplier": 1.0 },
            { "symbol": "OLDUSDTM", "type": "FFWCSX", "status": "Paused", "multiplier": 1.0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/level2/depth20"))
        .and(query_param("symbol", "XBTUSDTM"))
        .respond_with(kucoin_ok(json!({
            "bids": [["100000", 2000], ["99990", 1000]],
            "asks": [[100010.0, 1500]],
            "ts": 1_760_000_000_000_000_000i64
        })))
        .mount(&server)
        .await;

    let exchange = KucoinFutures::new(&config(ExchangeKind::Kucoin, &server)).unwrap();
    let listed = exchange.list_perpetuals().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.contains(&Symbol::from("XBTUSDTM")));

    let book = exchange.fetch_order_book(&Symbol::from("XBTUSDTM"), 5).await.unwrap();
    assert_eq!(book.bids.len(), 2);
    assert!((book.bids[0].volume - 2.0).abs() < 1e-9);
    assert!((book.asks[0].price - 100010.0).abs() < 1e-9);
    assert_eq!(book.timestamp, Some(1_760_000_000_000));
}

#[tokio::test]
async fn kucoin_current_rate_reports_next_settlement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/funding-rate/XBTUSDTM/current"))
        .respond_with(kucoin_ok(json!({
            "symbol": ".XBTUSDTMFPI8H",
            "granularity": 28_800_000,
            "timePoint": 1_760_000_000_000i64,
            "value": 0.0001
        })))
        .mount(&server)
        .await;

    let exchange = KucoinFutures::new(&config(ExchangeKind::Kucoin, &server)).unwrap();
    let current = exchange.fetch_current_funding_rate(&Symbol::from("XBTUSDTM")).await.unwrap();

    assert_eq!(current.rate, Some(0.0001));
    assert_eq!(current.next_payout_time, Some(1_760_028_800_000));
    assert_eq!(exchange.history_mode(), HistoryMode::Paged);
}

#[tokio::test]
async fn kucoin_history_is_oldest_first_and_limited() {
    let server = MockServer::start().await;
    let since = 1_760_000_000_000i64;
    Mock::given(method("GET"))
        .and(path("/api/v1/contract/funding-rates"))
        .and(query_param("symbol", "XBTUSDTM"))
        .and(query_param("from", since.to_string()))
        .respond_with(kucoin_ok(json!([
            { "symbol": "XBTUSDTM", "fundingRate": 0.0003, "timepoint": since + 3 * 28_800_000 },
            { "symbol": "XBTUSDTM", "fundingRate": 0.0002, "timepoint": since + 2 * 28_800_000 },
            { "symbol": "XBTUSDTM", "fundingRate": 0.0001, "timepoint": since + 28_800_000 }
        ])))
        .mount(&server)
        .await;

    let exchange = KucoinFutures::new(&config(ExchangeKind::Kucoin, &server)).unwrap();
    let history = exchange
        .fetch_funding_history(&Symbol::from("XBTUSDTM"), Some(since), Some(2))
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, since + 28_800_000);
    assert_eq!(history[1].rate, 0.0002);
}

#[tokio::test]
async fn kucoin_error_envelope_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/funding-rate/NOPE/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "100001",
            "msg": "Contract does not exist"
        })))
        .mount(&server)
        .await;

    let exchange = KucoinFutures::new(&config(ExchangeKind::Kucoin, &server)).unwrap();
    let result = exchange.fetch_current_funding_rate(&Symbol::from("NOPE")).await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, "100001");
            assert_eq!(message, "Contract does not exist");
        }
        other => panic!("expected api error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn kucoin_http_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/contracts/active"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let exchange = KucoinFutures::new(&config(ExchangeKind::Kucoin, &server)).unwrap();
    let result = exchange.list_perpetuals().await;

    assert!(matches!(result, Err(Error::Api { ref status, .. }) if status == "429"));
}

#[tokio::test]
async fn hyperliquid_lists_unified_symbols_without_delisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_partial_json(json!({ "type": "meta" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "universe": [
                { "name": "BTC", "szDecimals": 5 },
                { "name": "ETH", "szDecimals": 4 },
                { "name": "OLD", "szDecimals": 0, "isDelisted": true }
            ]
        })))
        .mount(&server)
        .await;

    let exchange = Hyperliquid::new(&config(ExchangeKind::Hyperliquid, &server)).unwrap();
    let listed = exchange.list_perpetuals().await.unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&Symbol::from("BTC/USDC:USDC")));
    assert!(!listed.contains(&Symbol::from("OLD/USDC:USDC")));
}

#[tokio::test]
async fn hyperliquid_book_and_current_rate_are_keyed_by_coin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_partial_json(json!({ "type": "l2Book", "coin": "ETH" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coin": "ETH",
            "time": 1_760_000_000_000i64,
            "levels": [
                [{ "px": "2500.1", "sz": "3.5", "n": 2 }],
                [{ "px": "2500.3", "sz": "1.25", "n": 1 }]
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_partial_json(json!({ "type": "metaAndAssetCtxs" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "universe": [{ "name": "BTC" }, { "name": "ETH" }] },
            [{ "funding": "0.0000125" }, { "funding": "-0.00002" }]
        ])))
        .mount(&server)
        .await;

    let exchange = Hyperliquid::new(&config(ExchangeKind::Hyperliquid, &server)).unwrap();
    let symbol = Symbol::from("ETH/USDC:USDC");

    let book = exchange.fetch_order_book(&symbol, 5).await.unwrap();
    assert!((book.bids[0].notional() - 2500.1 * 3.5).abs() < 1e-6);
    assert!((book.asks[0].volume - 1.25).abs() < 1e-9);

    let current = exchange.fetch_current_funding_rate(&symbol).await.unwrap();
    assert_eq!(current.rate, Some(-0.00002));
    let next = current.next_payout_time.unwrap();
    assert_eq!(next % 3_600_000, 0);
}

#[tokio::test]
async fn hyperliquid_history_arrives_in_one_call() {
    let server = MockServer::start().await;
    let since = 1_760_000_000_000i64;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_partial_json(json!({ "type": "fundingHistory", "coin": "BTC", "startTime": since })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "coin": "BTC", "fundingRate": "0.0000125", "premium": "0.0001", "time": since + 3_600_000 },
            { "coin": "BTC", "fundingRate": "0.00001", "premium": "0.0001", "time": since }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let exchange = Hyperliquid::new(&config(ExchangeKind::Hyperliquid, &server)).unwrap();
    let history = exchange
        .fetch_funding_history(&Symbol::from("BTC/USDC:USDC"), Some(since), None)
        .await
        .unwrap();

    assert_eq!(exchange.history_mode(), HistoryMode::Single);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, since);
    assert!((history[1].rate - 0.0000125).abs() < 1e-12);
}

#[tokio::test]
async fn hyperliquid_unknown_coin_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/info"))
        .and(body_partial_json(json!({ "type": "metaAndAssetCtxs" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "universe": [{ "name": "BTC" }] },
            [{ "funding": "0.0000125" }]
        ])))
        .mount(&server)
        .await;

    let exchange = Hyperliquid::new(&config(ExchangeKind::Hyperliquid, &server)).unwrap();
    let result = exchange.fetch_current_funding_rate(&Symbol::from("DOGE/USDC:USDC")).await;

    assert!(matches!(result, Err(Error::UnknownSymbol(_))));
}
