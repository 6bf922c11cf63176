//! Vendor bar-source contract.
//!
//! The only capability the sync engine needs from a data vendor is "fetch
//! bars in [start, end] at one granularity". Everything else — pacing,
//! retries, scheduling — belongs to the caller.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Granularity, RawBar, Ticker, UtcDateTime};

/// Classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Vendor unreachable or returned a server-side failure.
    Unavailable,
    /// Vendor rejected the request for pacing reasons.
    RateLimited,
    /// The request itself was malformed.
    InvalidRequest,
    /// The vendor responded but the payload could not be decoded.
    Decode,
}

/// Structured fetch error surfaced by [`BarSource`] implementations.
///
/// Recoverable by retry on a later scheduled cycle; never fatal to sibling
/// tickers in the same run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Unavailable => "fetch.unavailable",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::InvalidRequest => "fetch.invalid_request",
            FetchErrorKind::Decode => "fetch.decode",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Request payload for a bar fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticker: Ticker,
    pub start: UtcDateTime,
    pub end: UtcDateTime,
    pub granularity: Granularity,
    /// Transport timeout budget; the source never blocks past it.
    pub timeout_ms: u64,
}

impl FetchRequest {
    pub fn new(
        ticker: Ticker,
        start: UtcDateTime,
        end: UtcDateTime,
        granularity: Granularity,
        timeout_ms: u64,
    ) -> Result<Self, FetchError> {
        if end < start {
            return Err(FetchError::invalid_request(format!(
                "fetch window end {end} precedes start {start}"
            )));
        }
        if timeout_ms == 0 {
            return Err(FetchError::invalid_request(
                "fetch timeout must be greater than zero",
            ));
        }
        Ok(Self {
            ticker,
            start,
            end,
            granularity,
            timeout_ms,
        })
    }
}

/// Vendor source contract.
///
/// Returns zero or more rows with at least a closing price per usable row;
/// open/high/low/volume may be absent. An empty result is a valid answer
/// (market holiday, delisted ticker), not an error.
///
/// Implementations must be `Send + Sync`; they may be shared across tasks.
pub trait BarSource: Send + Sync {
    /// Stable identifier used in the ingest audit log.
    fn id(&self) -> &'static str;

    /// Fetch raw bars for one ticker over a closed window.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the vendor is unreachable, rate-limits
    /// the request, or produces an undecodable payload.
    fn fetch_bars<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawBar>, FetchError>> + Send + 'a>>;
}
