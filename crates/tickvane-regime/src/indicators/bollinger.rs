//! Bollinger band width.
//!
//! Bands: SMA(close, period) ± mult * stddev(close, period), population
//! stddev (divide by N). The classifier only needs the relative width
//! (upper − lower) / middle, expressed as a fraction (0.04 = 4%).
//! First valid value at index `period - 1`.

/// Band width as a fraction of the middle band.
pub fn bollinger_width_pct(closes: &[f64], period: usize, mult: f64) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &closes[(i + 1 - period)..=i];

        let mut sum = 0.0;
        let mut has_nan = false;
        for &value in window {
            if value.is_nan() {
                has_nan = true;
                break;
            }
            sum += value;
        }
        if has_nan {
            continue;
        }

        let mean = sum / period as f64;
        if mean == 0.0 {
            continue;
        }

        let variance = window
            .iter()
            .map(|&value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        // (upper - lower) / middle = 2 * mult * stddev / mean.
        result[i] = 2.0 * mult * stddev / mean;
    }

    result
}
