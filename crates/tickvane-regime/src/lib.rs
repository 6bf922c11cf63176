//! # tickvane-regime
//!
//! Indicator pipeline and market-regime classifier.
//!
//! The classifier is a pure function from an immutable ordered daily price
//! series to one of five labels: `NO_DATA`, `UPTREND`, `DOWNTREND`,
//! `SQUEEZE`, `SIDEWAYS`. Indicators are computed over the full series and
//! warm-up rows are trimmed before the decision cascade runs; fewer than 200
//! observations short-circuits to `NO_DATA` without any indicator work.

pub mod classifier;
pub mod indicators;

pub use classifier::{classify, classify_with_snapshot, RegimeSnapshot, MIN_HISTORY};
