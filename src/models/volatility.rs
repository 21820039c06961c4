use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::state::{PriceSeries, VolRegime, VolatilityMetrics};

/// Trading days per year used to annualize daily stddev.
/// Only meaningful when the series has one bar per trading day.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Window for the headline "current" volatility
pub const CURRENT_VOL_WINDOW: usize = 30;

/// Rolling window the percentile ranks against
pub const PERCENTILE_VOL_WINDOW: usize = 30;

/// Default number of trailing rolling-vol values in the percentile comparison set
pub const DEFAULT_PERCENTILE_LOOKBACK: usize = 252;

/// Short/medium/long rolling windows reported alongside current vol
const SHORT_VOL_WINDOW: usize = 10;
const MEDIUM_VOL_WINDOW: usize = 30;
const LONG_VOL_WINDOW: usize = 60;

/// Regime thresholds. Upper bound of each bucket is exclusive.
const LOW_REGIME_CEILING: f64 = 0.15;
const MODERATE_REGIME_CEILING: f64 = 0.25;
const ELEVATED_REGIME_CEILING: f64 = 0.35;

/// Fractional close-to-close changes. `result[k]` is the return into bar `k + 1`.
pub fn daily_returns(series: &PriceSeries) -> AnalyzerResult<Vec<f64>> {
    let bars = series.bars();
    if bars.len() < 2 {
        return Err(AnalyzerError::invalid(
            "series",
            bars.len(),
            "at least 2 closes required for returns",
        ));
    }
    Ok(bars
        .windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect())
}

/// Annualized stddev of the trailing `window` daily returns
/// (all of them when fewer are available).
pub fn historical_volatility(series: &PriceSeries, window: usize) -> AnalyzerResult<f64> {
    check_window(window)?;
    let returns = daily_returns(series)?;
    let vol = historical_volatility_from_returns(&returns, window)?;
    tracing::debug!(window, vol, "historical volatility");
    Ok(vol)
}

/// Rolling annualized vol aligned to the series' bars.
///
/// Bar `i` is `Some` once `window` returns end at it (i >= window). Earlier
/// positions are `None` rather than zero.
pub fn rolling_volatility(series: &PriceSeries, window: usize) -> AnalyzerResult<Vec<Option<f64>>> {
    check_window(window)?;
    let returns = daily_returns(series)?;
    Ok(rolling_volatility_from_returns(&returns, window))
}

/// Percentile rank in [0, 100] of `current_vol` among the last `lookback_days`
/// defined values of the 30-day rolling volatility.
///
/// Ties count half: mean of the `<` and `<=` fractions. An empty comparison
/// set is an error, not 0 or 100.
pub fn volatility_percentile(
    series: &PriceSeries,
    current_vol: f64,
    lookback_days: usize,
) -> AnalyzerResult<f64> {
    let returns = daily_returns(series)?;
    volatility_percentile_from_returns(&returns, current_vol, lookback_days)
}

pub fn classify_regime(volatility: f64) -> VolRegime {
    if volatility < LOW_REGIME_CEILING {
        VolRegime::Low
    } else if volatility < MODERATE_REGIME_CEILING {
        VolRegime::Moderate
    } else if volatility < ELEVATED_REGIME_CEILING {
        VolRegime::Elevated
    } else {
        VolRegime::High
    }
}

pub fn volatility_metrics(series: &PriceSeries) -> AnalyzerResult<VolatilityMetrics> {
    volatility_metrics_with_lookback(series, DEFAULT_PERCENTILE_LOOKBACK)
}

/// Full volatility snapshot. Returns are computed once and shared by every
/// statistic below.
pub fn volatility_metrics_with_lookback(
    series: &PriceSeries,
    lookback_days: usize,
) -> AnalyzerResult<VolatilityMetrics> {
    let returns = daily_returns(series)?;

    let current_volatility = historical_volatility_from_returns(&returns, CURRENT_VOL_WINDOW)?;
    let volatility_10d = latest_rolling(&returns, SHORT_VOL_WINDOW)?;
    let volatility_30d = latest_rolling(&returns, MEDIUM_VOL_WINDOW)?;
    let volatility_60d = latest_rolling(&returns, LONG_VOL_WINDOW)?;
    let volatility_percentile =
        volatility_percentile_from_returns(&returns, current_volatility, lookback_days)?;
    let volatility_regime = classify_regime(current_volatility);

    tracing::debug!(
        current = current_volatility,
        vol_10d = volatility_10d,
        vol_60d = volatility_60d,
        percentile = volatility_percentile,
        regime = %volatility_regime,
        "volatility metrics computed"
    );

    Ok(VolatilityMetrics {
        current_volatility,
        volatility_10d,
        volatility_30d,
        volatility_60d,
        volatility_percentile,
        volatility_regime,
    })
}

/// Percentile-of-score using the "mean" tie convention.
pub fn percentile_of_score(values: &[f64], score: f64) -> AnalyzerResult<f64> {
    if values.is_empty() {
        return Err(AnalyzerError::UndefinedStatistic(
            "percentile against an empty comparison set".into(),
        ));
    }
    let n = values.len() as f64;
    let below = values.iter().filter(|&&v| v < score).count() as f64;
    let at_or_below = values.iter().filter(|&&v| v <= score).count() as f64;
    Ok((below / n + at_or_below / n) * 50.0)
}

fn check_window(window: usize) -> AnalyzerResult<()> {
    if window < 2 {
        return Err(AnalyzerError::invalid("window", window, "window must be >= 2"));
    }
    Ok(())
}

fn historical_volatility_from_returns(returns: &[f64], window: usize) -> AnalyzerResult<f64> {
    let n = returns.len().min(window);
    if n < 2 {
        return Err(AnalyzerError::InsufficientData {
            required: 2,
            available: n,
        });
    }
    Ok(sample_std_dev(&returns[returns.len() - n..]) * TRADING_DAYS_PER_YEAR.sqrt())
}

fn rolling_volatility_from_returns(returns: &[f64], window: usize) -> Vec<Option<f64>> {
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    // One slot per bar; bar 0 has no return.
    let mut out = vec![None; returns.len() + 1];
    for end in window..=returns.len() {
        out[end] = Some(sample_std_dev(&returns[end - window..end]) * annualize);
    }
    out
}

fn latest_rolling(returns: &[f64], window: usize) -> AnalyzerResult<f64> {
    rolling_volatility_from_returns(returns, window)
        .last()
        .copied()
        .flatten()
        .ok_or(AnalyzerError::InsufficientData {
            required: window,
            available: returns.len(),
        })
}

fn volatility_percentile_from_returns(
    returns: &[f64],
    current_vol: f64,
    lookback_days: usize,
) -> AnalyzerResult<f64> {
    if !current_vol.is_finite() {
        return Err(AnalyzerError::invalid("current_vol", current_vol, "must be finite"));
    }
    if lookback_days == 0 {
        return Err(AnalyzerError::invalid("lookback_days", 0, "must be > 0"));
    }

    let rolling = rolling_volatility_from_returns(returns, PERCENTILE_VOL_WINDOW);
    // Tail first, then drop undefined positions.
    let start = rolling.len().saturating_sub(lookback_days);
    let recent: Vec<f64> = rolling[start..].iter().flatten().copied().collect();

    percentile_of_score(&recent, current_vol)
}

/// Sample (n - 1) standard deviation. Callers guarantee at least 2 values.
#[inline]
fn sample_std_dev(data: &[f64]) -> f64 {
    let nf = data.len() as f64;

    let mut sum: f64 = 0.0;
    for &x in data {
        sum += x;
    }
    let mean = sum / nf;

    let mut var_sum: f64 = 0.0;
    for &x in data {
        let d = x - mean;
        var_sum += d * d;
    }

    (var_sum / (nf - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PriceBar;
    use chrono::{Days, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    /// Closes whose daily returns alternate +r, -r.
    fn alternating_series(n: usize, r: f64) -> PriceSeries {
        let mut closes = Vec::with_capacity(n);
        let mut price = 4000.0;
        closes.push(price);
        for i in 1..n {
            let ret = if i % 2 == 1 { r } else { -r };
            price *= 1.0 + ret;
            closes.push(price);
        }
        series_from_closes(&closes)
    }

    #[test]
    fn test_daily_returns() {
        let series = series_from_closes(&[100.0, 110.0, 99.0]);
        let r = daily_returns(&series).unwrap();
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_daily_returns_needs_two_bars() {
        let series = series_from_closes(&[100.0]);
        assert!(matches!(
            daily_returns(&series),
            Err(AnalyzerError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_historical_vol_matches_known_variance() {
        // Alternating +1%/-1% over an even count: sample stddev is
        // 0.01 * sqrt(n / (n - 1)).
        let series = alternating_series(31, 0.01);
        let vol = historical_volatility(&series, 30).unwrap();
        let n = 30.0_f64;
        let expected = 0.01 * (n / (n - 1.0)).sqrt() * 252.0_f64.sqrt();
        assert!((vol - expected).abs() < 1e-12, "vol={vol} expected={expected}");
    }

    #[test]
    fn test_historical_vol_uses_trailing_window() {
        // Calm history followed by a volatile tail: a short window sees only the tail.
        let mut closes = vec![100.0; 50];
        let mut p = 100.0;
        for i in 0..10 {
            p *= if i % 2 == 0 { 1.05 } else { 0.95 };
            closes.push(p);
        }
        let series = series_from_closes(&closes);
        let short = historical_volatility(&series, 10).unwrap();
        let long = historical_volatility(&series, 59).unwrap();
        assert!(short > long, "short={short} long={long}");
    }

    #[test]
    fn test_historical_vol_uses_all_when_window_exceeds_data() {
        let series = alternating_series(11, 0.02);
        let a = historical_volatility(&series, 10).unwrap();
        let b = historical_volatility(&series, 500).unwrap();
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn test_historical_vol_insufficient() {
        let series = series_from_closes(&[100.0, 101.0]);
        assert!(matches!(
            historical_volatility(&series, 30),
            Err(AnalyzerError::InsufficientData { required: 2, available: 1 })
        ));
        assert!(matches!(
            historical_volatility(&series, 1),
            Err(AnalyzerError::InvalidInput { param: "window", .. })
        ));
    }

    #[test]
    fn test_rolling_alignment() {
        let series = alternating_series(15, 0.01);
        let rolling = rolling_volatility(&series, 10).unwrap();
        assert_eq!(rolling.len(), series.len());
        for (i, v) in rolling.iter().enumerate() {
            if i < 10 {
                assert!(v.is_none(), "bar {i} should be undefined");
            } else {
                assert!(v.is_some(), "bar {i} should be defined");
            }
        }
    }

    #[test]
    fn test_rolling_last_matches_historical() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        let series = series_from_closes(&closes);
        let rolling = rolling_volatility(&series, 30).unwrap();
        let last = rolling.last().copied().flatten().unwrap();
        let hv = historical_volatility(&series, 30).unwrap();
        assert!((last - hv).abs() < 1e-12);
    }

    /// Closes whose return magnitudes grow every bar, so every window's vol differs.
    fn widening_series(n: usize) -> PriceSeries {
        let mut closes = Vec::with_capacity(n);
        let mut price = 1000.0;
        closes.push(price);
        for i in 1..n {
            let r = 0.001 * i as f64;
            price *= if i % 2 == 1 { 1.0 + r } else { 1.0 - r };
            closes.push(price);
        }
        series_from_closes(&closes)
    }

    #[test]
    fn test_rolling_interior_matches_direct_formula() {
        let closes: Vec<f64> = (0..45).map(|i| 100.0 + (i as f64 * 0.9).sin() * (2.0 + i as f64 * 0.1)).collect();
        let series = series_from_closes(&closes);
        let window = 10;
        let rolling = rolling_volatility(&series, window).unwrap();

        for i in window..closes.len() {
            // Returns into bars i-window+1 ..= i
            let rets: Vec<f64> = (i + 1 - window..=i).map(|j| closes[j] / closes[j - 1] - 1.0).collect();
            let mean = rets.iter().sum::<f64>() / window as f64;
            let var = rets.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
            let expected = var.sqrt() * 252.0_f64.sqrt();
            let got = rolling[i].unwrap();
            assert!((got - expected).abs() < 1e-12, "bar {i}: got {got} expected {expected}");
        }
    }

    #[test]
    fn test_percentile_takes_tail_positions_then_drops_undefined() {
        // 41 bars: 30-day vol is defined at bars 30..=40, so the last 20
        // positions hold 9 undefined and 11 defined values.
        let series = widening_series(41);
        let rolling = rolling_volatility(&series, PERCENTILE_VOL_WINDOW).unwrap();
        let tail: Vec<f64> = rolling[rolling.len() - 20..].iter().flatten().copied().collect();
        assert_eq!(tail.len(), 11);

        let lowest = tail.iter().copied().fold(f64::INFINITY, f64::min);
        let p = volatility_percentile(&series, lowest, 20).unwrap();
        assert!((p - percentile_of_score(&tail, lowest).unwrap()).abs() < 1e-12);
        assert!((p - 50.0 / 11.0).abs() < 1e-9, "p={p}");

        // A shorter lookback drops older defined values: only the last 5 count.
        let last5: Vec<f64> = rolling[rolling.len() - 5..].iter().flatten().copied().collect();
        assert_eq!(last5.len(), 5);
        let p5 = volatility_percentile(&series, lowest, 5).unwrap();
        assert!((p5 - percentile_of_score(&last5, lowest).unwrap()).abs() < 1e-12);
        assert_eq!(p5, 0.0);
    }

    #[test]
    fn test_percentile_all_undefined_tail_errors() {
        let series = widening_series(25);
        assert!(matches!(
            volatility_percentile(&series, 0.2, 10),
            Err(AnalyzerError::UndefinedStatistic(_))
        ));
    }

    #[test]
    fn test_percentile_of_score_mean_convention() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile_of_score(&values, 3.0).unwrap() - 62.5).abs() < 1e-12);
        assert!((percentile_of_score(&values, 0.5).unwrap() - 0.0).abs() < 1e-12);
        assert!((percentile_of_score(&values, 10.0).unwrap() - 100.0).abs() < 1e-12);
        assert!((percentile_of_score(&values, 2.5).unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_empty_set_errors() {
        assert!(matches!(
            percentile_of_score(&[], 0.2),
            Err(AnalyzerError::UndefinedStatistic(_))
        ));
        // 20 bars never produce a defined 30-day rolling vol.
        let series = alternating_series(20, 0.01);
        assert!(matches!(
            volatility_percentile(&series, 0.2, 252),
            Err(AnalyzerError::UndefinedStatistic(_))
        ));
    }

    #[test]
    fn test_percentile_bounds() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let series = series_from_closes(&closes);
        let p_low = volatility_percentile(&series, 0.0, 252).unwrap();
        let p_high = volatility_percentile(&series, 10.0, 252).unwrap();
        assert_eq!(p_low, 0.0);
        assert_eq!(p_high, 100.0);
    }

    #[test]
    fn test_regime_boundaries() {
        assert_eq!(classify_regime(0.1499), VolRegime::Low);
        assert_eq!(classify_regime(0.15), VolRegime::Moderate);
        assert_eq!(classify_regime(0.2499), VolRegime::Moderate);
        assert_eq!(classify_regime(0.25), VolRegime::Elevated);
        assert_eq!(classify_regime(0.3499), VolRegime::Elevated);
        assert_eq!(classify_regime(0.35), VolRegime::High);
        assert_eq!(classify_regime(1.2), VolRegime::High);
    }

    #[test]
    fn test_metrics_constant_variance_round_trip() {
        let r = 0.01;
        let series = alternating_series(301, r);
        let m = volatility_metrics(&series).unwrap();

        // Even-length windows of alternating +-r have sample stddev r*sqrt(n/(n-1)).
        let expect = |n: f64| r * (n / (n - 1.0)).sqrt() * 252.0_f64.sqrt();
        assert!((m.current_volatility - expect(30.0)).abs() < 1e-9);
        assert!((m.volatility_10d - expect(10.0)).abs() < 1e-9);
        assert!((m.volatility_30d - expect(30.0)).abs() < 1e-9);
        assert!((m.volatility_60d - expect(60.0)).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&m.volatility_percentile));
        assert_eq!(m.volatility_regime, classify_regime(m.current_volatility));
    }

    #[test]
    fn test_metrics_insufficient_for_long_window() {
        // Enough for 10d and 30d, not for 60d.
        let series = alternating_series(45, 0.01);
        assert!(matches!(
            volatility_metrics(&series),
            Err(AnalyzerError::InsufficientData { required: 60, .. })
        ));
    }

    #[test]
    fn test_series_not_mutated() {
        let series = alternating_series(100, 0.01);
        let before = series.bars().to_vec();
        let _ = volatility_metrics(&series);
        assert_eq!(series.bars(), &before[..]);
    }
}
