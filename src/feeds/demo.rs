use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::state::{PriceBar, PriceSeries};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

/// Synthetic index parameters (roughly S&P 500 shaped)
const START_PRICE: f64 = 4200.0;
const ANNUAL_DRIFT: f64 = 0.10;
const ANNUAL_VOL: f64 = 0.18;
const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Total extra upward drift applied linearly across the path
const TREND_TOTAL: f64 = 0.20;

const OPEN_JITTER_SD: f64 = 0.002;
const WICK_MAX: f64 = 0.01;
const VOLUME_MEAN: f64 = 3.5e9;
const VOLUME_SD: f64 = 0.5e9;
const VOLUME_FLOOR: f64 = 1e9;

/// Default seed so demo runs are reproducible
pub const DEMO_SEED: u64 = 42;

/// Longest demo history. Keeps `years * 252` well inside `u32`.
pub const MAX_DEMO_YEARS: u32 = 50;

/// Geometric Brownian motion path over `years * 252` business days ending on
/// (or just before) `end`. Used when live data is unavailable; the analysis
/// treats it exactly like live data.
pub fn generate_demo_series(years: u32, end: NaiveDate, seed: u64) -> AnalyzerResult<PriceSeries> {
    let days = match years.checked_mul(TRADING_DAYS_PER_YEAR) {
        Some(d) if years > 0 && years <= MAX_DEMO_YEARS => d as usize,
        _ => return Err(AnalyzerError::invalid("years", years, "must be in 1..=50")),
    };

    let daily_drift = ANNUAL_DRIFT / TRADING_DAYS_PER_YEAR as f64;
    let daily_vol = ANNUAL_VOL / (TRADING_DAYS_PER_YEAR as f64).sqrt();

    let returns_dist = Normal::new(daily_drift, daily_vol).map_err(|e| AnalyzerError::Model(e.to_string()))?;
    let jitter_dist = Normal::new(0.0, OPEN_JITTER_SD).map_err(|e| AnalyzerError::Model(e.to_string()))?;
    let volume_dist = Normal::new(VOLUME_MEAN, VOLUME_SD).map_err(|e| AnalyzerError::Model(e.to_string()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let dates = business_days_ending(end, days);

    let mut log_level = 0.0;
    let mut bars = Vec::with_capacity(days);
    for (i, date) in dates.into_iter().enumerate() {
        // First step is pinned so the path starts at START_PRICE.
        let r = returns_dist.sample(&mut rng);
        if i > 0 {
            log_level += r;
        }
        let trend = TREND_TOTAL * i as f64 / (days - 1) as f64;
        let close = START_PRICE * f64::exp(log_level) * (1.0 + trend);

        let open = close * (1.0 + jitter_dist.sample(&mut rng));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..WICK_MAX));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..WICK_MAX));
        let volume = volume_dist.sample(&mut rng).max(VOLUME_FLOOR) as u64;

        bars.push(PriceBar { date, open, high, low, close, volume });
    }

    let series = PriceSeries::new(bars)?;
    tracing::info!(
        bars = series.len(),
        last_close = series.last_close(),
        "generated demo price history"
    );
    Ok(series)
}

/// `count` Mon-Fri dates in ascending order, the last one on or before `end`.
fn business_days_ending(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut day = end;
    while out.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    out.reverse();
    out
}
