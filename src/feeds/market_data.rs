use crate::config::AppConfig;
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::state::{PriceBar, PriceSeries};
use reqwest::Client;

const MAX_ATTEMPTS: u32 = 3;

/// Daily OHLCV history from the Yahoo Finance chart API.
/// Retries transient failures with a short linear backoff.
pub async fn fetch_price_history(cfg: &AppConfig) -> AnalyzerResult<PriceSeries> {
    tracing::info!(symbol = %cfg.symbol, range = %cfg.history_range, "fetching price history");

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent("Mozilla/5.0 (compatible; condor_rusty/0.1)")
        .build()?;

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match fetch_once(&client, &cfg.market_data_base_url, &cfg.symbol, &cfg.history_range).await {
            Ok(series) => {
                tracing::info!(bars = series.len(), last_close = series.last_close(), "price history retrieved");
                return Ok(series);
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(error = %e, attempt, "price history fetch failed");
                tokio::time::sleep(tokio::time::Duration::from_secs(2 * attempt as u64)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

// Chart API response shape (fields we use):
// {
//   "chart": {
//     "result": [{
//       "timestamp": [1704205800, ...],
//       "indicators": { "quote": [{ "open": [...], "high": [...], "low": [...],
//                                   "close": [...], "volume": [...] }] }
//     }],
//     "error": null
//   }
// }
// Any value inside the quote arrays may be null.

#[derive(serde::Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(serde::Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(serde::Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(serde::Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(serde::Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(serde::Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

async fn fetch_once(client: &Client, base_url: &str, symbol: &str, range: &str) -> AnalyzerResult<PriceSeries> {
    let url = format!(
        "{}/v8/finance/chart/{}",
        base_url.trim_end_matches('/'),
        symbol.replace('^', "%5E")
    );

    let resp = client
        .get(&url)
        .query(&[("range", range), ("interval", "1d")])
        .send()
        .await
        .map_err(|e| AnalyzerError::MarketData(format!("request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AnalyzerError::MarketData(format!("HTTP {status}: {body}")));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| AnalyzerError::MarketData(format!("read body: {e}")))?;

    parse_chart(&body)
}

/// Turn a chart payload into a validated series.
///
/// Rows with any missing field are skipped. A repeated date (the live
/// intraday bar is sometimes duplicated) keeps the later row.
pub fn parse_chart(body: &str) -> AnalyzerResult<PriceSeries> {
    let data: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = data.chart.error {
        return Err(AnalyzerError::MarketData(format!(
            "{}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| AnalyzerError::MarketData("no chart result in response".into()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AnalyzerError::MarketData("no quote block in response".into()))?;

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let row = (
            chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()),
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            skipped += 1;
            continue;
        };

        let bar = PriceBar { date, open, high, low, close, volume };
        match bars.last_mut() {
            Some(prev) if prev.date == date => *prev = bar,
            _ => bars.push(bar),
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped incomplete chart rows");
    }

    if bars.is_empty() {
        return Err(AnalyzerError::MarketData("chart response contained no usable bars".into()));
    }

    PriceSeries::new(bars)
}
