//! Single-ticker regime classification.
//!
//! A vendor outage never turns into a fault here: the label is computed
//! from whatever the store already holds, flagged as stale.

use serde_json::{json, Value};

use tickvane_core::{Ticker, UtcDateTime};
use tickvane_regime::classify_with_snapshot;
use tickvane_sync::SyncEngine;

use crate::cli::RegimeArgs;
use crate::error::CliError;

pub async fn run(args: &RegimeArgs, engine: &SyncEngine) -> Result<Value, CliError> {
    let ticker = Ticker::parse(&args.ticker)?;
    let now = UtcDateTime::now();

    let (bars, sync) = if args.no_refresh {
        (engine.daily_history(&ticker, now)?, None)
    } else {
        let (bars, report) = engine.read_through(&ticker, now).await?;
        (bars, Some(report))
    };

    let (regime, snapshot) = classify_with_snapshot(&bars);

    Ok(json!({
        "ticker": ticker.as_str(),
        "regime": regime,
        "stale": sync.as_ref().map(|report| report.stale),
        "sync": sync,
        "snapshot": snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tickvane_core::YahooBarSource;
    use tickvane_warehouse::{BarStore, StoreConfig};

    fn offline_engine(temp: &tempfile::TempDir) -> SyncEngine {
        let store = BarStore::open(StoreConfig::at(temp.path())).expect("store open");
        SyncEngine::new(store, Arc::new(YahooBarSource::default()))
    }

    #[tokio::test]
    async fn offline_refresh_produces_a_label_with_snapshot() {
        let temp = tempdir().expect("tempdir");
        let engine = offline_engine(&temp);

        let args = RegimeArgs {
            ticker: String::from("aapl"),
            no_refresh: false,
        };
        let value = run(&args, &engine).await.expect("regime");

        assert_eq!(value["ticker"], "AAPL");
        // A year of weekday bars clears the 200-row floor, so the cascade
        // runs and backs the label with a snapshot.
        assert_ne!(value["regime"], "NO_DATA");
        assert!(value["snapshot"].is_object());
        assert_eq!(value["stale"], false);
    }

    #[tokio::test]
    async fn empty_cache_without_refresh_is_no_data_not_a_fault() {
        let temp = tempdir().expect("tempdir");
        let engine = offline_engine(&temp);

        let args = RegimeArgs {
            ticker: String::from("AAPL"),
            no_refresh: true,
        };
        let value = run(&args, &engine).await.expect("regime");

        assert_eq!(value["regime"], "NO_DATA");
        assert!(value["snapshot"].is_null());
        assert!(value["stale"].is_null());
    }
}
