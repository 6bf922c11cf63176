use serde::{Deserialize, Serialize};

use crate::{Ticker, UtcDateTime, ValidationError};

/// OHLCV bar record for one ticker at one instant.
///
/// Prices are validated finite and strictly positive at construction. The
/// high/low envelope is assumed but not enforced: vendor backfill
/// corrections occasionally ship rows where open or close sit outside
/// [low, high], and those rows still overwrite the stored ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ticker: Ticker,
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        ticker: Ticker,
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_positive("open", open)?;
        validate_positive("high", high)?;
        validate_positive("low", low)?;
        validate_positive("close", close)?;

        Ok(Self {
            ticker,
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// A vendor row before cleaning.
///
/// Every price field may be absent; the sync engine's cleaning step decides
/// what survives. Only the fetch adapters and the cleaner see this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub ts: UtcDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> UtcDateTime {
        UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn builds_valid_bar() {
        let bar = Bar::new(
            Ticker::parse("AAPL").expect("ticker"),
            ts(),
            100.0,
            105.0,
            99.0,
            103.0,
            1_000,
        )
        .expect("bar");
        assert_eq!(bar.volume, 1_000);
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = Bar::new(
            Ticker::parse("AAPL").expect("ticker"),
            ts(),
            100.0,
            105.0,
            0.0,
            103.0,
            1_000,
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::NonPositiveValue { field: "low" }));
    }

    #[test]
    fn rejects_non_finite_price() {
        let err = Bar::new(
            Ticker::parse("AAPL").expect("ticker"),
            ts(),
            f64::NAN,
            105.0,
            99.0,
            103.0,
            1_000,
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { field: "open" }));
    }

    #[test]
    fn allows_inverted_envelope() {
        // Vendor corrections may place close above high; stored as-is.
        let bar = Bar::new(
            Ticker::parse("AAPL").expect("ticker"),
            ts(),
            100.0,
            101.0,
            99.0,
            102.5,
            0,
        );
        assert!(bar.is_ok());
    }
}
