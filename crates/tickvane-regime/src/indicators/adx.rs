//! Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from consecutive bars
//! 2. Wilder-smooth +DM, -DM, and TR (alpha = 1/period)
//! 3. ±DI = 100 * smoothed(±DM) / smoothed(TR)
//! 4. DX = 100 * |+DI − -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! A zero-TR window (perfectly flat prices) yields DI = 0 and DX = 0 rather
//! than an undefined value, so degenerate series still reach the decision
//! cascade instead of losing every row to the NaN trim.
//!
//! First valid value at index 2 * period - 1 (one `period` warm-up for the
//! DI smoothing, another for the DX smoothing).

use tickvane_core::Bar;

use crate::indicators::atr::{true_range, wilder_smooth};

/// ADX over `period`, conventionally in [0, 100].
pub fn adx(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    if n < 2 {
        return vec![f64::NAN; n];
    }

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_high = bars[i - 1].high;
        let prev_low = bars[i - 1].low;

        if high.is_nan() || low.is_nan() || prev_high.is_nan() || prev_low.is_nan() {
            continue;
        }

        let high_diff = high - prev_high;
        let low_diff = prev_low - low;

        plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 {
            high_diff
        } else {
            0.0
        };
        minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 {
            low_diff
        } else {
            0.0
        };
    }

    let smooth_tr = wilder_smooth(&true_range(bars), period);
    let smooth_plus_dm = wilder_smooth(&plus_dm, period);
    let smooth_minus_dm = wilder_smooth(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_plus_dm[i].is_nan() || smooth_minus_dm[i].is_nan() {
            continue;
        }

        let (plus_di, minus_di) = if smooth_tr[i] == 0.0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * smooth_plus_dm[i] / smooth_tr[i],
                100.0 * smooth_minus_dm[i] / smooth_tr[i],
            )
        };

        let di_sum = plus_di + minus_di;
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
    }

    wilder_smooth(&dx, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn adx_stays_in_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let result = adx(&bars, 3);

        for (i, &value) in result.iter().enumerate() {
            if !value.is_nan() {
                assert!((0.0..=100.0).contains(&value), "ADX out of bounds at {i}: {value}");
            }
        }
    }

    #[test]
    fn strong_trend_elevates_adx() {
        let mut data = Vec::new();
        for i in 0..30 {
            let base = 100.0 + f64::from(i) * 5.0;
            data.push((base - 1.0, base + 3.0, base - 3.0, base + 2.0));
        }
        let bars = make_ohlc_bars(&data);
        let result = adx(&bars, 5);

        let last = result.iter().rev().find(|v| !v.is_nan()).copied().expect("some value");
        assert!(last > 25.0, "ADX should be elevated in a strong trend, got {last}");
    }

    #[test]
    fn flat_series_adx_is_zero_not_nan() {
        let bars = make_ohlc_bars(&[(100.0, 100.0, 100.0, 100.0); 40]);
        let result = adx(&bars, 14);
        let last = result[39];
        assert!(!last.is_nan());
        assert_approx(last, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn warm_up_spans_two_periods() {
        let mut data = Vec::new();
        for i in 0..30 {
            let base = 100.0 + f64::from(i % 7);
            data.push((base - 0.5, base + 1.0, base - 1.0, base + 0.5));
        }
        let bars = make_ohlc_bars(&data);
        let period = 5;
        let result = adx(&bars, period);

        for value in &result[..2 * period - 1] {
            assert!(value.is_nan());
        }
        assert!(!result[2 * period - 1].is_nan());
    }

    #[test]
    fn too_few_bars_all_nan() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = adx(&bars, 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
