//! # tickvane-sync
//!
//! Incremental synchronization engine.
//!
//! For each ticker the engine derives the minimal fetch window from the
//! store's own contents — the watermark is always recomputed, never cached,
//! so it cannot drift from the stored rows — fetches the delta, cleans it,
//! and upserts it atomically. Classification reads the refreshed series
//! from the store, never from the fetch result, so pre-existing history and
//! newly merged rows are seen uniformly.

pub mod clean;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Duration;
use uuid::Uuid;

use tickvane_core::{Bar, BarSource, FetchError, FetchRequest, Granularity, Ticker, UtcDateTime};
use tickvane_warehouse::{BarStore, StoreError};

pub use clean::{clean_rows, CleanOutcome};

/// Calendar days of daily history guaranteed before classification.
pub const DAILY_HISTORY_DAYS: i64 = 365;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Errors from one ticker's sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Vendor failure; the ticker is skipped this cycle and retried on the
    /// next scheduled run.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Store failure; fatal for this ticker's cycle. The fetched batch is
    /// discarded rather than partially applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one refresh cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Rows the vendor returned.
    pub fetched: usize,
    /// Rows written (inserted or overwritten).
    pub upserted: usize,
    /// Rows discarded by cleaning.
    pub dropped: usize,
    /// True when the store was already up to date and no fetch was issued.
    pub skipped_fetch: bool,
}

impl SyncOutcome {
    fn skipped() -> Self {
        Self {
            fetched: 0,
            upserted: 0,
            dropped: 0,
            skipped_fetch: true,
        }
    }
}

/// Outcome of a read-through refresh, tolerant of vendor outages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcome: Option<SyncOutcome>,
    /// True when the refresh could not reach the vendor and the series
    /// below comes from cache alone.
    pub stale: bool,
    pub fetch_error: Option<String>,
}

/// Per-ticker synchronization engine over one store and one vendor source.
#[derive(Clone)]
pub struct SyncEngine {
    store: BarStore,
    source: Arc<dyn BarSource>,
    timeout_ms: u64,
}

impl SyncEngine {
    pub fn new(store: BarStore, source: Arc<dyn BarSource>) -> Self {
        Self {
            store,
            source,
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn store(&self) -> &BarStore {
        &self.store
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Bring the store's daily series up to date, fetching only the missing
    /// suffix.
    pub async fn refresh_daily(
        &self,
        ticker: &Ticker,
        now: UtcDateTime,
    ) -> Result<SyncOutcome, SyncError> {
        let window = match self.store.latest_timestamp(Granularity::Daily, ticker)? {
            None => Some((daily_required_start(now), now)),
            Some(last) if last.date() < now.date() => Some((last + Duration::days(1), now)),
            Some(_) => None,
        };

        let Some((start, end)) = window else {
            tracing::debug!(ticker = %ticker, "daily series already up to date");
            return Ok(SyncOutcome::skipped());
        };

        self.fetch_and_store(ticker, start, end, Granularity::Daily)
            .await
    }

    /// Refresh the current day's minute bars. No delta planning: the window
    /// is already minimal and the upsert is idempotent.
    pub async fn refresh_intraday(
        &self,
        ticker: &Ticker,
        now: UtcDateTime,
    ) -> Result<SyncOutcome, SyncError> {
        self.fetch_and_store(ticker, now - Duration::days(1), now, Granularity::Intraday)
            .await
    }

    /// The daily series classification consumes: everything stored from
    /// `now - 365 days`, ascending.
    pub fn daily_history(
        &self,
        ticker: &Ticker,
        now: UtcDateTime,
    ) -> Result<Vec<Bar>, StoreError> {
        self.store
            .bars_since(Granularity::Daily, ticker, daily_required_start(now))
    }

    /// Refresh, then read the merged series from the store.
    ///
    /// A vendor failure does not block the read: the cached series is
    /// returned with `stale = true` in the report. A store failure
    /// propagates.
    pub async fn read_through(
        &self,
        ticker: &Ticker,
        now: UtcDateTime,
    ) -> Result<(Vec<Bar>, SyncReport), StoreError> {
        let report = match self.refresh_daily(ticker, now).await {
            Ok(outcome) => SyncReport {
                outcome: Some(outcome),
                stale: false,
                fetch_error: None,
            },
            Err(SyncError::Fetch(error)) => {
                tracing::warn!(ticker = %ticker, error = %error, "fetch failed, serving cached series");
                SyncReport {
                    outcome: None,
                    stale: true,
                    fetch_error: Some(error.to_string()),
                }
            }
            Err(SyncError::Store(error)) => return Err(error),
        };

        let bars = self.daily_history(ticker, now)?;
        Ok((bars, report))
    }

    async fn fetch_and_store(
        &self,
        ticker: &Ticker,
        start: UtcDateTime,
        end: UtcDateTime,
        granularity: Granularity,
    ) -> Result<SyncOutcome, SyncError> {
        let request = FetchRequest::new(
            ticker.clone(),
            start,
            end,
            granularity,
            self.timeout_ms,
        )?;
        let rows = self.source.fetch_bars(request).await?;
        let fetched = rows.len();

        if fetched == 0 {
            // Holiday, delisted, or suspended: nothing to do.
            tracing::debug!(ticker = %ticker, %granularity, "fetch returned no rows");
            return Ok(SyncOutcome {
                fetched: 0,
                upserted: 0,
                dropped: 0,
                skipped_fetch: false,
            });
        }

        let cleaned = clean_rows(ticker, rows);
        let request_id = format!("sync:{granularity}:{}", Uuid::new_v4());
        let upserted = self.store.upsert_bars(
            granularity,
            self.source.id(),
            request_id.as_str(),
            &cleaned.bars,
        )?;

        tracing::debug!(
            ticker = %ticker,
            %granularity,
            fetched,
            upserted,
            dropped = cleaned.dropped,
            "merged vendor batch"
        );

        Ok(SyncOutcome {
            fetched,
            upserted,
            dropped: cleaned.dropped,
            skipped_fetch: false,
        })
    }
}

fn daily_required_start(now: UtcDateTime) -> UtcDateTime {
    now - Duration::days(DAILY_HISTORY_DAYS)
}
