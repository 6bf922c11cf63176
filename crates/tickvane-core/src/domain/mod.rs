//! Canonical domain types for tickvane market data.
//!
//! All models validate their invariants at construction and serialize with
//! serde:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated, upper-cased equity ticker |
//! | [`Granularity`] | Daily vs. intraday series |
//! | [`UtcDateTime`] | RFC3339 timestamp guaranteed UTC |
//! | [`Bar`] | OHLCV observation keyed by (ticker, ts) |
//! | [`RawBar`] | Vendor row before cleaning (optional fields) |
//! | [`Regime`] | Five-variant market-regime label |

mod bar;
mod granularity;
mod regime;
mod ticker;
mod timestamp;

pub use bar::{Bar, RawBar};
pub use granularity::Granularity;
pub use regime::Regime;
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
