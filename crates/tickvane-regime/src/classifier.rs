//! Regime decision cascade.
//!
//! Consumes an ascending daily series, computes the indicator set over the
//! whole history, drops the warm-up rows, and labels the most recent row.
//! Pure: no storage, no network, trivially testable with synthetic series.

use serde::{Deserialize, Serialize};

use tickvane_core::{Bar, Regime, UtcDateTime};

use crate::indicators::{adx, atr, bollinger_width_pct, sma};

/// Minimum observations required before any indicator work is attempted.
/// One short of the slow-trend window means `NO_DATA`.
pub const MIN_HISTORY: usize = 200;

const SMA_FAST: usize = 20;
const SMA_MID: usize = 50;
const SMA_SLOW: usize = 200;
const ADX_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const BAND_PERIOD: usize = 20;
const BAND_STD: f64 = 2.0;
const RANGE_WINDOW: usize = 20;

// Cascade thresholds. These exact values define the label boundaries and
// must not drift.
const ADX_TREND_MIN: f64 = 25.0;
const SQUEEZE_MAX_WIDTH: f64 = 0.04;
const SQUEEZE_MAX_RANGE: f64 = 0.20;

/// Latest indicator values backing a label.
///
/// `atr_pct` is carried for observability even though the cascade does not
/// consult it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub ts: UtcDateTime,
    pub close: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub sma20_slope: f64,
    pub adx14: f64,
    pub atr14: f64,
    pub atr_pct: f64,
    pub band_width_pct: f64,
    pub range_pct: f64,
    /// Rows that survived the warm-up trim.
    pub rows_used: usize,
}

/// Label a daily series.
pub fn classify(bars: &[Bar]) -> Regime {
    classify_with_snapshot(bars).0
}

/// Label a daily series and expose the indicator snapshot behind the label.
/// The snapshot is absent exactly when the label is `NO_DATA`.
pub fn classify_with_snapshot(bars: &[Bar]) -> (Regime, Option<RegimeSnapshot>) {
    if bars.len() < MIN_HISTORY {
        return (Regime::NoData, None);
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();

    let sma20 = sma(&closes, SMA_FAST);
    let sma50 = sma(&closes, SMA_MID);
    let sma200 = sma(&closes, SMA_SLOW);
    let adx14 = adx(bars, ADX_PERIOD);
    let atr14 = atr(bars, ATR_PERIOD);
    let width = bollinger_width_pct(&closes, BAND_PERIOD, BAND_STD);

    // Drop every row with an unresolved look-back window.
    let first_valid = (0..bars.len()).find(|&i| {
        sma20[i].is_finite()
            && sma50[i].is_finite()
            && sma200[i].is_finite()
            && adx14[i].is_finite()
            && atr14[i].is_finite()
            && width[i].is_finite()
    });
    let Some(first_valid) = first_valid else {
        return (Regime::NoData, None);
    };

    let last = bars.len() - 1;
    let rows_used = last - first_valid + 1;
    let close = bars[last].close;

    let slope = if rows_used > 1 {
        sma20[last] - sma20[last - 1]
    } else {
        0.0
    };

    let range_start = last + 1 - rows_used.min(RANGE_WINDOW);
    let range_window = &bars[range_start..=last];
    let high = range_window.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
    let low = range_window.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
    let range_pct = (high - low) / close;

    let snapshot = RegimeSnapshot {
        ts: bars[last].ts,
        close,
        sma20: sma20[last],
        sma50: sma50[last],
        sma200: sma200[last],
        sma20_slope: slope,
        adx14: adx14[last],
        atr14: atr14[last],
        atr_pct: atr14[last] / close,
        band_width_pct: width[last],
        range_pct,
        rows_used,
    };

    let bullish = snapshot.sma20 > snapshot.sma50 && snapshot.sma50 > snapshot.sma200;
    let bearish = snapshot.sma20 < snapshot.sma50 && snapshot.sma50 < snapshot.sma200;

    // First matching rule wins; equal SMAs and zero slope fall through to
    // the volatility rules.
    let regime = if snapshot.adx14 > ADX_TREND_MIN && bullish && slope > 0.0 {
        Regime::Uptrend
    } else if snapshot.adx14 > ADX_TREND_MIN && bearish && slope < 0.0 {
        Regime::Downtrend
    } else if snapshot.band_width_pct < SQUEEZE_MAX_WIDTH && range_pct < SQUEEZE_MAX_RANGE {
        Regime::Squeeze
    } else {
        Regime::Sideways
    };

    (regime, Some(snapshot))
}
