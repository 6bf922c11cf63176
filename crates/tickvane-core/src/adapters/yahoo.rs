//! Yahoo Finance chart-API bar source.
//!
//! Speaks the public v8 chart endpoint with an explicit epoch-second window,
//! which maps one-to-one onto [`FetchRequest`]. Null entries in the chart
//! arrays are preserved as `None` on the raw rows; deciding what survives is
//! the sync engine's cleaning step, not the adapter's.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::Duration;

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::source::{BarSource, FetchError, FetchRequest};
use crate::{Granularity, RawBar, Ticker, UtcDateTime};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo bar source supporting both real API calls and a deterministic fake
/// mode for offline runs and tests.
#[derive(Clone)]
pub struct YahooBarSource {
    http_client: Arc<dyn HttpClient>,
    use_real_api: bool,
}

impl Default for YahooBarSource {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            use_real_api: false,
        }
    }
}

impl YahooBarSource {
    /// Live adapter over a reqwest transport.
    pub fn live() -> Self {
        Self {
            http_client: Arc::new(ReqwestHttpClient::new()),
            use_real_api: true,
        }
    }

    /// Adapter over a caller-supplied transport; real parsing path.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            use_real_api: true,
        }
    }

    fn chart_url(req: &FetchRequest) -> String {
        format!(
            "{CHART_BASE}/{}?period1={}&period2={}&interval={}&events=history",
            urlencoding::encode(req.ticker.as_str()),
            req.start.unix_timestamp(),
            req.end.unix_timestamp(),
            req.granularity.as_str(),
        )
    }

    async fn fetch_real(&self, req: &FetchRequest) -> Result<Vec<RawBar>, FetchError> {
        let request = HttpRequest::get(Self::chart_url(req))
            .with_header("accept", "application/json")
            .with_timeout_ms(req.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| FetchError::unavailable(format!("yahoo transport error: {e}")))?;

        if response.status == 429 {
            return Err(FetchError::rate_limited("yahoo returned status 429"));
        }

        // Unknown or delisted tickers come back 404 with a "No data found"
        // error payload; that is a valid empty answer, not a failure.
        if !response.is_success() {
            if let Ok(decoded) = serde_json::from_str::<ChartResponse>(&response.body) {
                if decoded
                    .chart
                    .error
                    .as_ref()
                    .is_some_and(|e| e.description.to_ascii_lowercase().contains("no data"))
                {
                    return Ok(Vec::new());
                }
            }
            return Err(FetchError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        decode_chart(&response.body)
    }

    /// Deterministic synthetic bars for offline mode: a slow drift seeded by
    /// the ticker name, weekdays only for daily granularity.
    fn fetch_fake(req: &FetchRequest) -> Vec<RawBar> {
        let seed = ticker_seed(&req.ticker);
        let step = match req.granularity {
            Granularity::Daily => Duration::days(1),
            Granularity::Intraday => Duration::minutes(1),
        };

        let mut rows = Vec::new();
        let mut ts = match req.granularity {
            Granularity::Daily => UtcDateTime::at_midnight(req.start.date()),
            Granularity::Intraday => req.start,
        };

        let mut index: u64 = 0;
        while ts <= req.end {
            let trading_day = !matches!(
                ts.date().weekday(),
                time::Weekday::Saturday | time::Weekday::Sunday
            );
            if trading_day {
                let base = 90.0 + ((seed + index) % 350) as f64 / 10.0;
                rows.push(RawBar {
                    ts,
                    open: Some(base),
                    high: Some(base + 1.20),
                    low: Some(base - 0.80),
                    close: Some(base + 0.30),
                    volume: Some(20_000.0 + index as f64 * 25.0),
                });
                index += 1;
            }
            ts = ts + step;
        }

        rows
    }
}

impl BarSource for YahooBarSource {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_bars<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawBar>, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real(&req).await
            } else {
                Ok(Self::fetch_fake(&req))
            }
        })
    }
}

fn decode_chart(body: &str) -> Result<Vec<RawBar>, FetchError> {
    let decoded: ChartResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::decode(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = &decoded.chart.error {
        return Err(FetchError::unavailable(format!(
            "yahoo chart API error: {} ({})",
            error.description, error.code
        )));
    }

    let Some(result) = decoded.chart.result.into_iter().flatten().next() else {
        return Ok(Vec::new());
    };

    let Some(timestamps) = result.timestamp else {
        // Holiday windows come back with a meta block and no timestamps.
        return Ok(Vec::new());
    };

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::decode("chart response carries no quote arrays"))?;

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &epoch) in timestamps.iter().enumerate() {
        let ts = UtcDateTime::from_unix_timestamp(epoch)
            .map_err(|e| FetchError::decode(format!("invalid chart timestamp: {e}")))?;

        rows.push(RawBar {
            ts,
            open: array_value(&quote.open, i),
            high: array_value(&quote.high, i),
            low: array_value(&quote.low, i),
            close: array_value(&quote.close, i),
            volume: array_value(&quote.volume, i),
        });
    }

    Ok(rows)
}

fn array_value(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn ticker_seed(ticker: &Ticker) -> u64 {
    ticker.as_str().bytes().map(u64::from).sum()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
