//! Whole-universe regime map, optionally filtered to one label.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use tickvane_core::{Regime, UtcDateTime};
use tickvane_regime::classify;
use tickvane_sync::SyncEngine;

use crate::cli::RegimesArgs;
use crate::error::CliError;

use super::resolve_tickers;

pub async fn run(args: &RegimesArgs, engine: &SyncEngine) -> Result<Value, CliError> {
    let tickers = resolve_tickers(&args.tickers)?;
    let filter = args
        .label
        .as_deref()
        .map(Regime::from_str)
        .transpose()
        .map_err(CliError::Validation)?;
    let now = UtcDateTime::now();

    let mut regimes = Map::new();
    let mut matching = Vec::new();
    let mut failed = Vec::new();

    for ticker in &tickers {
        match engine.read_through(ticker, now).await {
            Ok((bars, report)) => {
                let regime = classify(&bars);
                if report.stale {
                    tracing::warn!(ticker = %ticker, "classified from stale cache");
                }
                if let Some(wanted) = filter {
                    if regime == wanted {
                        matching.push(ticker.as_str().to_string());
                    }
                } else {
                    regimes.insert(ticker.as_str().to_string(), json!(regime));
                }
            }
            Err(error) => {
                tracing::warn!(ticker = %ticker, error = %error, "ticker failed, skipping");
                failed.push(json!({
                    "ticker": ticker.as_str(),
                    "error": error.to_string(),
                }));
            }
        }
    }

    let value = match &args.label {
        Some(label) => json!({
            "label": label.to_ascii_uppercase(),
            "tickers": matching,
            "failed": failed,
        }),
        None => json!({
            "regimes": Value::Object(regimes),
            "failed": failed,
        }),
    };

    Ok(value)
}
