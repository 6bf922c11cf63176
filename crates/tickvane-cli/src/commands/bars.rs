//! Stored-bar listings.

use std::str::FromStr;

use serde_json::{json, Value};

use tickvane_core::{Granularity, Ticker};
use tickvane_warehouse::BarStore;

use crate::cli::BarsArgs;
use crate::error::CliError;

pub fn run(args: &BarsArgs, store: &BarStore) -> Result<Value, CliError> {
    let granularity =
        Granularity::from_str(&args.granularity).map_err(CliError::Validation)?;

    match &args.ticker {
        Some(raw) => {
            let ticker = Ticker::parse(raw)?;
            let bars = store.bars_for_ticker(granularity, &ticker)?;
            Ok(json!({
                "ticker": ticker.as_str(),
                "granularity": granularity,
                "count": bars.len(),
                "bars": bars,
            }))
        }
        None => {
            let bars = store.all_bars(granularity, args.skip, args.limit)?;
            Ok(json!({
                "granularity": granularity,
                "skip": args.skip,
                "limit": args.limit,
                "count": bars.len(),
                "bars": bars,
            }))
        }
    }
}
