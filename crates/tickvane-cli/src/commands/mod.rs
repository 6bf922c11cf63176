//! Command dispatch.

pub mod bars;
pub mod regime;
pub mod regimes;
pub mod status;
pub mod sync;

use std::sync::Arc;

use serde_json::Value;

use tickvane_core::{BarSource, Ticker, YahooBarSource};
use tickvane_sync::SyncEngine;
use tickvane_warehouse::{BarStore, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::universe;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = match &cli.data_dir {
        Some(dir) => StoreConfig::at(dir),
        None => StoreConfig::default(),
    };
    let store = BarStore::open(config)?;

    let source: Arc<dyn BarSource> = if cli.offline {
        Arc::new(YahooBarSource::default())
    } else {
        Arc::new(YahooBarSource::live())
    };
    let engine = SyncEngine::new(store, source).with_timeout_ms(cli.timeout_ms);

    match &cli.command {
        Command::Sync(args) => sync::run(args, &engine).await,
        Command::Regime(args) => regime::run(args, &engine).await,
        Command::Regimes(args) => regimes::run(args, &engine).await,
        Command::Bars(args) => bars::run(args, engine.store()),
        Command::Status => status::run(engine.store()),
    }
}

/// Universe for this run: the override list when given, the S&P 100
/// otherwise.
pub(crate) fn resolve_tickers(overrides: &[String]) -> Result<Vec<Ticker>, CliError> {
    let raw: Vec<&str> = if overrides.is_empty() {
        universe::SNP_100_TICKERS.to_vec()
    } else {
        overrides.iter().map(String::as_str).collect()
    };

    raw.into_iter()
        .map(|value| Ticker::parse(value).map_err(CliError::from))
        .collect()
}
