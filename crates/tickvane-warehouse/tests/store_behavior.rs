//! Behavior tests for the bar store across process boundaries.
//!
//! The in-crate unit tests cover the query surface; these verify that data
//! and schema survive a reopen and that double-applying a batch after a
//! reopen still deduplicates.

use tempfile::tempdir;

use tickvane_core::{Bar, Granularity, Ticker, UtcDateTime};
use tickvane_warehouse::{BarStore, StoreConfig};

fn bar(ticker: &str, ts: &str, close: f64) -> Bar {
    Bar::new(
        Ticker::parse(ticker).expect("ticker"),
        UtcDateTime::parse(ts).expect("ts"),
        close - 1.0,
        close + 2.0,
        close - 2.0,
        close,
        5_000,
    )
    .expect("bar")
}

#[test]
fn data_survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let config = StoreConfig::at(temp.path());

    {
        let store = BarStore::open(config.clone()).expect("store open");
        store
            .upsert_bars(
                Granularity::Daily,
                "yahoo",
                "req-1",
                &[bar("AAPL", "2024-03-01T00:00:00Z", 100.0)],
            )
            .expect("upsert");
    }

    let reopened = BarStore::open(config).expect("store reopen");
    let stored = reopened
        .bars_for_ticker(Granularity::Daily, &Ticker::parse("AAPL").expect("ticker"))
        .expect("query");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].close, 100.0);
}

#[test]
fn migrations_are_idempotent_across_reopens() {
    let temp = tempdir().expect("tempdir");
    let config = StoreConfig::at(temp.path());

    let first = BarStore::open(config.clone()).expect("first open");
    drop(first);
    let second = BarStore::open(config.clone()).expect("second open");
    drop(second);
    let third = BarStore::open(config).expect("third open");

    assert!(third.last_update_timestamp().expect("query").is_none());
}

#[test]
fn replayed_batch_after_reopen_does_not_duplicate() {
    let temp = tempdir().expect("tempdir");
    let config = StoreConfig::at(temp.path());
    let rows = vec![
        bar("MSFT", "2024-03-01T00:00:00Z", 410.0),
        bar("MSFT", "2024-03-04T00:00:00Z", 412.0),
    ];

    {
        let store = BarStore::open(config.clone()).expect("store open");
        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &rows)
            .expect("upsert");
    }

    let reopened = BarStore::open(config).expect("store reopen");
    reopened
        .upsert_bars(Granularity::Daily, "yahoo", "req-1-replayed", &rows)
        .expect("upsert");

    let stored = reopened
        .bars_for_ticker(Granularity::Daily, &Ticker::parse("MSFT").expect("ticker"))
        .expect("query");
    assert_eq!(stored.len(), 2);
}
