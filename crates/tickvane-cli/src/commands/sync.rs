//! Batch cache refresh across the ticker universe.
//!
//! One ticker's failure never aborts the rest of the run; it is logged,
//! counted, and retried on the next scheduled invocation.

use serde_json::{json, Value};

use tickvane_core::UtcDateTime;
use tickvane_sync::SyncEngine;

use crate::cli::SyncArgs;
use crate::error::CliError;

use super::resolve_tickers;

pub async fn run(args: &SyncArgs, engine: &SyncEngine) -> Result<Value, CliError> {
    let tickers = resolve_tickers(&args.tickers)?;
    let now = UtcDateTime::now();

    tracing::info!(
        tickers = tickers.len(),
        intraday = args.intraday,
        source = engine.source_id(),
        "starting sync run"
    );

    let mut processed = 0usize;
    let mut rows_upserted = 0usize;
    let mut rows_dropped = 0usize;
    let mut failed = Vec::new();

    for ticker in &tickers {
        match engine.refresh_daily(ticker, now).await {
            Ok(outcome) => {
                tracing::info!(
                    ticker = %ticker,
                    fetched = outcome.fetched,
                    upserted = outcome.upserted,
                    dropped = outcome.dropped,
                    skipped = outcome.skipped_fetch,
                    "daily refresh"
                );
                processed += 1;
                rows_upserted += outcome.upserted;
                rows_dropped += outcome.dropped;
            }
            Err(error) => {
                tracing::warn!(ticker = %ticker, error = %error, "ticker failed, skipping");
                failed.push(json!({
                    "ticker": ticker.as_str(),
                    "error": error.to_string(),
                }));
                continue;
            }
        }

        if args.intraday {
            match engine.refresh_intraday(ticker, now).await {
                Ok(outcome) => {
                    rows_upserted += outcome.upserted;
                    rows_dropped += outcome.dropped;
                }
                Err(error) => {
                    tracing::warn!(ticker = %ticker, error = %error, "intraday refresh failed");
                    failed.push(json!({
                        "ticker": ticker.as_str(),
                        "error": error.to_string(),
                    }));
                }
            }
        }
    }

    tracing::info!(
        processed,
        rows_upserted,
        rows_dropped,
        failed = failed.len(),
        "sync run finished"
    );

    if processed == 0 && !tickers.is_empty() {
        return Err(CliError::Command(format!(
            "all {} tickers failed this run",
            tickers.len()
        )));
    }

    Ok(json!({
        "processed": processed,
        "rows_upserted": rows_upserted,
        "rows_dropped": rows_dropped,
        "failed": failed,
    }))
}
