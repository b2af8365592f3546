// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::sync::Arc;

use costbook::db::{LazyStore, Location};
use costbook::fx::ConversionService;
use costbook::models::Currency;
use costbook::rates::RatesBridge;
use costbook::settings::{RATES_KEY, Settings};
use costbook::{ErrorKind, Ledger};
use rust_decimal_macros::dec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const GOOD: &str = r#"{"USD": 1, "GBP": 1.8, "EURO": 0.7, "ILS": 3.4}"#;

/// Serves a single HTTP response on a random local port and returns its URL.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        sock.write_all(resp.as_bytes()).await.unwrap();
        sock.shutdown().await.unwrap();
    });
    format!("http://{}/rates.json", addr)
}

fn make_bridge(dir: &Path) -> (RatesBridge, Settings, Arc<ConversionService>) {
    let store = Arc::new(LazyStore::new(
        Location::Dir(dir.to_path_buf()),
        "costsdb",
        Some(2),
    ));
    let settings = Settings::new(store);
    let fx = Arc::new(ConversionService::new());
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let bridge = RatesBridge::with_client(client, settings.clone(), Arc::clone(&fx));
    (bridge, settings, fx)
}

#[tokio::test]
async fn fetch_validates_saves_and_applies() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, settings, fx) = make_bridge(dir.path());
    let url = serve_once("200 OK", GOOD).await;

    let table = bridge.fetch_rates(&url).await.unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(fx.convert(dec!(100), Currency::Gbp, Currency::Usd).unwrap(), dec!(180));

    let saved = settings.saved_rates().await.unwrap().unwrap();
    assert_eq!(saved, table);
}

#[tokio::test]
async fn bad_responses_leave_nothing_behind() {
    let cases: [(&str, &str, ErrorKind); 3] = [
        ("200 OK", r#"{"USD": 1, "GBP": 1.8}"#, ErrorKind::InvalidRates),
        ("404 Not Found", GOOD, ErrorKind::Fetch),
        ("200 OK", "{not json", ErrorKind::InvalidRates),
    ];
    for (status, body, kind) in cases {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, settings, fx) = make_bridge(dir.path());
        let url = serve_once(status, body).await;

        let err = bridge.fetch_rates(&url).await.unwrap_err();
        assert_eq!(err.kind(), kind, "{} {}", status, body);
        assert!(!fx.is_set());
        assert!(settings.get(RATES_KEY).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn empty_url_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, _settings, fx) = make_bridge(dir.path());
    let err = bridge.fetch_rates("   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    let err = bridge.refresh().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(!fx.is_set());
}

#[tokio::test]
async fn failed_fetch_keeps_previous_rates() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, settings, fx) = make_bridge(dir.path());
    let url = serve_once("200 OK", GOOD).await;
    bridge.fetch_rates(&url).await.unwrap();

    let url = serve_once("200 OK", r#"{"USD": 1, "GBP": -2, "EURO": 0.7, "ILS": 3.4}"#).await;
    assert!(bridge.fetch_rates(&url).await.is_err());
    assert_eq!(fx.convert(dec!(10), Currency::Gbp, Currency::Usd).unwrap(), dec!(18));
    assert_eq!(
        settings.saved_rates().await.unwrap().unwrap().get(Currency::Gbp),
        Some(dec!(1.8))
    );
}

#[tokio::test]
async fn url_is_trimmed_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, _settings, _fx) = make_bridge(dir.path());
    assert_eq!(bridge.url().await.unwrap(), "");

    let url = serve_once("200 OK", GOOD).await;
    bridge.save_url(&format!("  {}  ", url)).await.unwrap();
    assert_eq!(bridge.url().await.unwrap(), url);

    // A second bridge over the same directory sees it too.
    let (again, _, fx) = make_bridge(dir.path());
    assert_eq!(again.url().await.unwrap(), url);
    again.refresh().await.unwrap();
    assert!(fx.is_set());
}

#[tokio::test]
async fn saved_rates_are_reapplied_on_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (bridge, _, _) = make_bridge(dir.path());
        let url = serve_once("200 OK", GOOD).await;
        bridge.fetch_rates(&url).await.unwrap();
    }

    let ledger = Ledger::new(Location::Dir(dir.path().to_path_buf()), "costsdb", Some(2)).unwrap();
    assert!(!ledger.fx().is_set());
    ledger.bootstrap().await.unwrap();
    assert!(ledger.fx().is_set());
    assert_eq!(
        ledger.fx().convert(dec!(7), Currency::Euro, Currency::Usd).unwrap(),
        dec!(4.9)
    );
}

#[tokio::test]
async fn unreadable_saved_rates_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (bridge, settings, fx) = make_bridge(dir.path());
    settings.set(RATES_KEY, "{\"USD\": 1}").await.unwrap();
    assert!(!bridge.apply_saved_rates().await.unwrap());
    assert!(!fx.is_set());
}
