//! Pure indicator functions over ordered bar series.
//!
//! Each function returns a vector aligned with its input, NaN where the
//! look-back window is not yet resolved. The classifier trims those rows
//! before running its decision cascade.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod sma;

pub use adx::adx;
pub use atr::{atr, true_range, wilder_smooth};
pub use bollinger::bollinger_width_pct;
pub use sma::sma;

/// Synthetic OHLC bars for indicator tests.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<tickvane_core::Bar> {
    use tickvane_core::{Bar, Ticker, UtcDateTime};
    use time::macros::date;
    use time::Duration;

    let base = UtcDateTime::at_midnight(date!(2024 - 01 - 02));
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new(
                Ticker::parse("TEST").expect("ticker"),
                base + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1_000,
            )
            .expect("bar")
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
