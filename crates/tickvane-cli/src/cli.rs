//! CLI argument definitions for tickvane.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sync` | Refresh the bar cache for the ticker universe |
//! | `regime` | Classify one ticker's market regime |
//! | `regimes` | Classify the whole universe, optionally filtered by label |
//! | `bars` | List stored bars for one ticker or page through all of them |
//! | `status` | Show the last stored update timestamp |
//!
//! # Examples
//!
//! ```bash
//! # Nightly cache refresh for the default universe
//! tickvane sync
//!
//! # One ticker, with the indicator snapshot behind the label
//! tickvane regime AAPL --pretty
//!
//! # Every ticker currently in a squeeze
//! tickvane regimes --label SQUEEZE
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Cached market data and regime labels for an equity universe.
#[derive(Debug, Parser)]
#[command(
    name = "tickvane",
    author,
    version,
    about = "Cached market data and regime labels for an equity universe"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Data directory (defaults to $TICKVANE_HOME, then ~/.tickvane).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Vendor fetch timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Use the deterministic offline vendor source instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh the daily bar cache for the ticker universe.
    Sync(SyncArgs),
    /// Classify one ticker's market regime.
    Regime(RegimeArgs),
    /// Classify every ticker in the universe.
    Regimes(RegimesArgs),
    /// List stored bars.
    Bars(BarsArgs),
    /// Show the last stored update timestamp.
    Status,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Comma-separated ticker override for this run.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Also refresh the current day's minute bars.
    #[arg(long, default_value_t = false)]
    pub intraday: bool,
}

#[derive(Debug, Args)]
pub struct RegimeArgs {
    /// Ticker to classify.
    pub ticker: String,

    /// Classify the cached history without contacting the vendor.
    #[arg(long, default_value_t = false)]
    pub no_refresh: bool,
}

#[derive(Debug, Args)]
pub struct RegimesArgs {
    /// Comma-separated ticker override for this run.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Keep only tickers whose label matches (e.g. SQUEEZE).
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Debug, Args)]
pub struct BarsArgs {
    /// Ticker to list; omit for the paged listing across all tickers.
    pub ticker: Option<String>,

    /// Series granularity: 1d or 1m.
    #[arg(long, default_value = "1d")]
    pub granularity: String,

    /// Rows to skip (paged listing only).
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Maximum rows to return (paged listing only).
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}
