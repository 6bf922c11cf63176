//! # tickvane-warehouse
//!
//! DuckDB-backed bar store.
//!
//! One file database holds two bar tables (daily, intraday), each uniquely
//! keyed by (ticker, ts). Batch upsert is idempotent and atomic: a batch
//! commits whole or rolls back whole, and re-applying the same batch leaves
//! the stored state unchanged. Reads on an unknown ticker return empty
//! results, never errors — "no data" is a valid state.
//!
//! All statements carrying caller data are parameterized.

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::Connection;
use ::duckdb::ToSql;
use thiserror::Error;

use tickvane_core::{Bar, Granularity, Ticker, UtcDateTime};

pub use crate::duckdb::{DuckDbConnectionManager, PooledConnection};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying `DuckDB` error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (database directory creation).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt stored row: {detail}")]
    Corrupt { detail: String },
}

/// Configuration for the bar store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for tickvane data.
    pub home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home = resolve_home();
        let db_path = home.join("cache").join("tickvane.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl StoreConfig {
    /// Config rooted at an explicit data directory.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let db_path = home.join("cache").join("tickvane.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// The deduplicated (ticker, ts) bar store.
#[derive(Clone)]
pub struct BarStore {
    manager: DuckDbConnectionManager,
}

impl BarStore {
    /// Open a store with default configuration.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    /// Open a store, creating the database file and schema if needed.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Idempotent batch upsert.
    ///
    /// Rows matching an existing (ticker, ts) overwrite that row's OHLCV
    /// fields; new rows are inserted. The whole batch commits atomically or
    /// not at all. Returns the number of rows affected.
    pub fn upsert_bars(
        &self,
        granularity: Granularity,
        source: &str,
        request_id: &str,
        rows: &[Bar],
    ) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let table = granularity.table();
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, StoreError> {
            let insert_sql = format!(
                "INSERT OR REPLACE INTO {table} \
                 (ticker, ts, open, high, low, close, volume, source, updated_at) \
                 VALUES (?, TRY_CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)"
            );

            let mut affected = 0;
            for row in rows {
                let ticker = row.ticker.as_str();
                let ts = row.ts.format_rfc3339();
                let volume = i64::try_from(row.volume).unwrap_or(i64::MAX);
                let params: [&dyn ToSql; 8] = [
                    &ticker,
                    &ts,
                    &row.open,
                    &row.high,
                    &row.low,
                    &row.close,
                    &volume,
                    &source,
                ];
                affected += connection.execute(insert_sql.as_str(), params.as_slice())?;
            }

            let batch_ticker = batch_ticker(rows);
            let dataset = granularity.as_str();
            let row_count = rows.len() as i64;
            let params: [&dyn ToSql; 5] = [
                &request_id,
                &batch_ticker,
                &source,
                &dataset,
                &row_count,
            ];
            connection.execute(
                "INSERT INTO ingest_log \
                 (request_id, ticker, source, dataset, status, row_count, timestamp) \
                 VALUES (?, ?, ?, ?, 'ok', ?, CURRENT_TIMESTAMP)",
                params.as_slice(),
            )?;

            Ok(affected)
        })();

        finalize_transaction(&connection, result)
    }

    /// Latest stored timestamp for a ticker, or `None` when no rows exist.
    pub fn latest_timestamp(
        &self,
        granularity: Granularity,
        ticker: &Ticker,
    ) -> Result<Option<UtcDateTime>, StoreError> {
        let connection = self.manager.acquire()?;
        let sql = format!(
            "SELECT strftime(MAX(ts), '%Y-%m-%dT%H:%M:%SZ') FROM {} WHERE ticker = ?",
            granularity.table()
        );
        let ticker = ticker.as_str();
        let params: [&dyn ToSql; 1] = [&ticker];
        let value: Option<String> =
            connection.query_row(sql.as_str(), params.as_slice(), |row| row.get(0))?;
        value.as_deref().map(parse_stored_ts).transpose()
    }

    /// Bars for one ticker from `start` (inclusive), ascending by timestamp.
    pub fn bars_since(
        &self,
        granularity: Granularity,
        ticker: &Ticker,
        start: UtcDateTime,
    ) -> Result<Vec<Bar>, StoreError> {
        let sql = format!(
            "SELECT ticker, strftime(ts, '%Y-%m-%dT%H:%M:%SZ'), open, high, low, close, volume \
             FROM {} WHERE ticker = ? AND ts >= TRY_CAST(? AS TIMESTAMP) ORDER BY ts ASC",
            granularity.table()
        );
        let ticker = ticker.as_str();
        let start = start.format_rfc3339();
        let params: [&dyn ToSql; 2] = [&ticker, &start];
        self.query_bars(sql.as_str(), params.as_slice())
    }

    /// All bars for one ticker, ascending by timestamp.
    pub fn bars_for_ticker(
        &self,
        granularity: Granularity,
        ticker: &Ticker,
    ) -> Result<Vec<Bar>, StoreError> {
        let sql = format!(
            "SELECT ticker, strftime(ts, '%Y-%m-%dT%H:%M:%SZ'), open, high, low, close, volume \
             FROM {} WHERE ticker = ? ORDER BY ts ASC",
            granularity.table()
        );
        let ticker = ticker.as_str();
        let params: [&dyn ToSql; 1] = [&ticker];
        self.query_bars(sql.as_str(), params.as_slice())
    }

    /// Paged listing across all tickers, ordered by (ticker, ts).
    pub fn all_bars(
        &self,
        granularity: Granularity,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Bar>, StoreError> {
        let sql = format!(
            "SELECT ticker, strftime(ts, '%Y-%m-%dT%H:%M:%SZ'), open, high, low, close, volume \
             FROM {} ORDER BY ticker ASC, ts ASC LIMIT ? OFFSET ?",
            granularity.table()
        );
        let limit = limit as i64;
        let skip = skip as i64;
        let params: [&dyn ToSql; 2] = [&limit, &skip];
        self.query_bars(sql.as_str(), params.as_slice())
    }

    /// Most recent stored timestamp across both granularity tables.
    pub fn last_update_timestamp(&self) -> Result<Option<UtcDateTime>, StoreError> {
        let connection = self.manager.acquire()?;
        let value: Option<String> = connection.query_row(
            "SELECT strftime(MAX(ts), '%Y-%m-%dT%H:%M:%SZ') FROM ( \
             SELECT MAX(ts) AS ts FROM bars_1d UNION ALL SELECT MAX(ts) AS ts FROM bars_1m)",
            [],
            |row| row.get(0),
        )?;
        value.as_deref().map(parse_stored_ts).transpose()
    }

    fn query_bars(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Bar>, StoreError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(sql)?;
        let rows = statement.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut bars = Vec::new();
        for row in rows {
            let (ticker, ts, open, high, low, close, volume) = row?;
            bars.push(Bar {
                ticker: Ticker::parse(&ticker).map_err(|e| StoreError::Corrupt {
                    detail: format!("ticker '{ticker}': {e}"),
                })?,
                ts: parse_stored_ts(&ts)?,
                open,
                high,
                low,
                close,
                volume: volume.max(0) as u64,
            });
        }
        Ok(bars)
    }
}

/// Commit on success, roll back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// Single distinct ticker of a batch, if uniform; audit-log metadata only.
fn batch_ticker(rows: &[Bar]) -> Option<String> {
    let first = rows.first()?;
    rows.iter()
        .all(|row| row.ticker == first.ticker)
        .then(|| first.ticker.as_str().to_string())
}

fn parse_stored_ts(value: &str) -> Result<UtcDateTime, StoreError> {
    UtcDateTime::parse(value).map_err(|e| StoreError::Corrupt {
        detail: format!("timestamp '{value}': {e}"),
    })
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKVANE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickvane");
    }

    PathBuf::from(".tickvane")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, BarStore) {
        let temp = tempdir().expect("tempdir");
        let store = BarStore::open(StoreConfig::at(temp.path())).expect("store open");
        (temp, store)
    }

    fn bar(ticker: &str, ts: &str, close: f64) -> Bar {
        Bar::new(
            Ticker::parse(ticker).expect("ticker"),
            UtcDateTime::parse(ts).expect("ts"),
            close - 1.0,
            close + 2.0,
            close - 2.0,
            close,
            1_000,
        )
        .expect("bar")
    }

    #[test]
    fn empty_store_reads_are_empty_not_errors() {
        let (_temp, store) = open_temp();
        let ticker = Ticker::parse("AAPL").expect("ticker");

        assert!(store
            .latest_timestamp(Granularity::Daily, &ticker)
            .expect("query")
            .is_none());
        assert!(store
            .bars_for_ticker(Granularity::Daily, &ticker)
            .expect("query")
            .is_empty());
        assert!(store.last_update_timestamp().expect("query").is_none());
    }

    #[test]
    fn upsert_is_idempotent() {
        let (_temp, store) = open_temp();
        let rows = vec![
            bar("AAPL", "2024-03-01T00:00:00Z", 100.0),
            bar("AAPL", "2024-03-04T00:00:00Z", 101.5),
        ];

        let first = store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &rows)
            .expect("upsert");
        let second = store
            .upsert_bars(Granularity::Daily, "yahoo", "req-2", &rows)
            .expect("upsert");
        assert_eq!(first, 2);
        assert_eq!(second, 2);

        let stored = store
            .bars_for_ticker(Granularity::Daily, &Ticker::parse("AAPL").expect("ticker"))
            .expect("query");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored, rows);
    }

    #[test]
    fn conflicting_upsert_overwrites_in_place() {
        let (_temp, store) = open_temp();
        let original = vec![bar("MSFT", "2024-03-01T00:00:00Z", 410.0)];
        let revised = vec![bar("MSFT", "2024-03-01T00:00:00Z", 415.5)];

        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &original)
            .expect("upsert");
        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-2", &revised)
            .expect("upsert");

        let stored = store
            .bars_for_ticker(Granularity::Daily, &Ticker::parse("MSFT").expect("ticker"))
            .expect("query");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].close, 415.5);
    }

    #[test]
    fn bars_since_is_inclusive_and_ascending() {
        let (_temp, store) = open_temp();
        let rows = vec![
            bar("AAPL", "2024-03-01T00:00:00Z", 100.0),
            bar("AAPL", "2024-03-04T00:00:00Z", 101.0),
            bar("AAPL", "2024-03-05T00:00:00Z", 102.0),
        ];
        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &rows)
            .expect("upsert");

        let since = store
            .bars_since(
                Granularity::Daily,
                &Ticker::parse("AAPL").expect("ticker"),
                UtcDateTime::parse("2024-03-04T00:00:00Z").expect("ts"),
            )
            .expect("query");
        assert_eq!(since.len(), 2);
        assert_eq!(since[0].ts, UtcDateTime::parse("2024-03-04T00:00:00Z").expect("ts"));
        assert!(since[0].ts < since[1].ts);
    }

    #[test]
    fn granularities_do_not_mix() {
        let (_temp, store) = open_temp();
        let daily = vec![bar("AAPL", "2024-03-01T00:00:00Z", 100.0)];
        let intraday = vec![bar("AAPL", "2024-03-01T15:30:00Z", 100.2)];

        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &daily)
            .expect("upsert");
        store
            .upsert_bars(Granularity::Intraday, "yahoo", "req-2", &intraday)
            .expect("upsert");

        let ticker = Ticker::parse("AAPL").expect("ticker");
        assert_eq!(
            store.bars_for_ticker(Granularity::Daily, &ticker).expect("query").len(),
            1
        );
        assert_eq!(
            store
                .bars_for_ticker(Granularity::Intraday, &ticker)
                .expect("query")
                .len(),
            1
        );
    }

    #[test]
    fn all_bars_pages_in_ticker_then_ts_order() {
        let (_temp, store) = open_temp();
        let rows = vec![
            bar("MSFT", "2024-03-01T00:00:00Z", 410.0),
            bar("AAPL", "2024-03-01T00:00:00Z", 100.0),
            bar("AAPL", "2024-03-04T00:00:00Z", 101.0),
        ];
        store
            .upsert_bars(Granularity::Daily, "yahoo", "req-1", &rows)
            .expect("upsert");

        let page = store.all_bars(Granularity::Daily, 0, 2).expect("query");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].ticker.as_str(), "AAPL");
        assert_eq!(page[1].ticker.as_str(), "AAPL");

        let rest = store.all_bars(Granularity::Daily, 2, 2).expect("query");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].ticker.as_str(), "MSFT");
    }

    #[test]
    fn last_update_spans_both_tables() {
        let (_temp, store) = open_temp();
        store
            .upsert_bars(
                Granularity::Daily,
                "yahoo",
                "req-1",
                &[bar("AAPL", "2024-03-01T00:00:00Z", 100.0)],
            )
            .expect("upsert");
        store
            .upsert_bars(
                Granularity::Intraday,
                "yahoo",
                "req-2",
                &[bar("AAPL", "2024-03-01T15:30:00Z", 100.2)],
            )
            .expect("upsert");

        let last = store.last_update_timestamp().expect("query").expect("some");
        assert_eq!(last, UtcDateTime::parse("2024-03-01T15:30:00Z").expect("ts"));
    }
}
