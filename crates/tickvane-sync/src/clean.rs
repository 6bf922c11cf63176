//! Vendor row cleaning.
//!
//! Close is the anchor field: a row without a usable close is dropped and
//! counted, never raised — partial vendor data is routine. Missing open,
//! high, or low are reconstructed from the close ("close-anchored fill"),
//! trading strict accuracy for availability. Volume coerces to a
//! non-negative integer, defaulting to zero.

use tickvane_core::{Bar, RawBar, Ticker};

/// Result of cleaning one fetched batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub bars: Vec<Bar>,
    /// Rows discarded for lacking an anchor close or usable numerics.
    pub dropped: usize,
}

/// Clean a fetched batch into storable bars.
pub fn clean_rows(ticker: &Ticker, rows: Vec<RawBar>) -> CleanOutcome {
    let mut bars = Vec::with_capacity(rows.len());
    let mut dropped = 0;

    for row in rows {
        let Some(close) = usable_price(row.close) else {
            dropped += 1;
            continue;
        };

        let open = usable_price(row.open).unwrap_or(close);
        let high = usable_price(row.high).unwrap_or(close);
        let low = usable_price(row.low).unwrap_or(close);
        let volume = row
            .volume
            .filter(|v| v.is_finite() && *v > 0.0)
            .map_or(0, |v| v as u64);

        match Bar::new(ticker.clone(), row.ts, open, high, low, close, volume) {
            Ok(bar) => bars.push(bar),
            Err(_) => dropped += 1,
        }
    }

    CleanOutcome { bars, dropped }
}

fn usable_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
