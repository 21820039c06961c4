use crate::errors::{AnalyzerError, AnalyzerResult};
use chrono::{DateTime, Local, NaiveDate};

// ── Price Input ──

/// One daily OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Chronologically ordered daily bars.
///
/// Validated once at construction and never mutated afterwards. Statistics
/// derived from it (returns, rolling vol) are returned as separate values.
/// Annualization downstream assumes one bar per trading day.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> AnalyzerResult<Self> {
        if bars.is_empty() {
            return Err(AnalyzerError::invalid("series", 0, "price series is empty"));
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(AnalyzerError::invalid("close", bar.close, "close prices must be > 0"));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AnalyzerError::invalid("date", bar.date, "dates must be strictly ascending"));
            }
        }
        Ok(Self { bars })
    }

    #[inline]
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: construction rejects an empty series.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent close. Construction guarantees at least one bar.
    #[inline]
    pub fn last_close(&self) -> f64 {
        self.bars[self.bars.len() - 1].close
    }

    #[inline]
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }
}

/// Descriptive statistics over the whole series.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PriceStats {
    pub current_price: f64,
    pub mean_price: f64,
    /// Sample standard deviation of closes; `None` for a single bar.
    pub std_dev: Option<f64>,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_volume: f64,
}

impl PriceStats {
    pub fn compute(series: &PriceSeries) -> Self {
        let n = series.len() as f64;
        let mean_price = series.closes().sum::<f64>() / n;
        let std_dev = if series.len() < 2 {
            None
        } else {
            let ss = series.closes().map(|c| (c - mean_price) * (c - mean_price)).sum::<f64>();
            Some((ss / (n - 1.0)).sqrt())
        };
        let (min_price, max_price) = series
            .closes()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c), hi.max(c)));
        let avg_volume = series.bars().iter().map(|b| b.volume as f64).sum::<f64>() / n;

        Self {
            current_price: series.last_close(),
            mean_price,
            std_dev,
            min_price,
            max_price,
            avg_volume,
        }
    }
}

// ── Volatility ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolRegime {
    Low,
    Moderate,
    Elevated,
    High,
}

impl VolRegime {
    /// One-line read on how the regime suits selling an iron condor.
    pub fn assessment(&self) -> &'static str {
        match self {
            Self::Low => "Low volatility environment - smaller credits expected",
            Self::Moderate => "Moderate volatility - good environment for iron condors",
            Self::Elevated => "Elevated volatility - excellent for iron condors",
            Self::High => "High volatility - risky environment",
        }
    }

    pub fn favors_condors(&self) -> bool {
        matches!(self, Self::Moderate | Self::Elevated)
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::Low => &[
                "Smaller credits expected",
                "Consider waiting for higher volatility",
                "Or use tighter strikes with lower risk",
            ],
            Self::Moderate => &[
                "Balanced risk/reward environment",
                "Reasonable credit potential",
                "Proceed with standard position sizing",
            ],
            Self::Elevated => &[
                "Higher credits available",
                "Good premium collection environment",
                "Monitor for increased price movement",
            ],
            Self::High => &[
                "Significant price swings expected",
                "Consider wider strikes",
                "Reduce position size or wait for calm",
            ],
        }
    }
}

impl std::fmt::Display for VolRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Elevated => write!(f, "ELEVATED"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Annualized volatility snapshot. All vol values are fractions (0.20 = 20%).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct VolatilityMetrics {
    pub current_volatility: f64,
    pub volatility_10d: f64,
    pub volatility_30d: f64,
    pub volatility_60d: f64,
    /// Percentile rank in [0, 100]
    pub volatility_percentile: f64,
    pub volatility_regime: VolRegime,
}

// ── Iron Condor Outputs ──

/// The four legs plus the move they were built from.
///
/// long_put < short_put <= short_call < long_call
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct StrikeSet {
    pub long_put: f64,
    pub short_put: f64,
    pub short_call: f64,
    pub long_call: f64,
    pub current_price: f64,
    pub expected_move: f64,
    pub expected_move_pct: f64,
}

impl StrikeSet {
    #[inline]
    pub fn put_width(&self) -> f64 {
        self.short_put - self.long_put
    }

    #[inline]
    pub fn call_width(&self) -> f64 {
        self.long_call - self.short_call
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ExpectedMove {
    pub expected_move: f64,
    pub upper_range: f64,
    pub lower_range: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ProfitLossZone {
    pub max_profit: f64,
    pub max_loss: f64,
    pub estimated_credit: f64,
    pub breakeven_lower: f64,
    pub breakeven_upper: f64,
    pub profit_zone_width: f64,
    pub profit_zone_pct: f64,
    pub risk_reward_ratio: f64,
    /// Percent
    pub return_on_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ProbabilityMetrics {
    /// Percent in [0, 100]
    pub probability_of_profit: f64,
    pub lower_breakeven_std_dev: f64,
    pub upper_breakeven_std_dev: f64,
    /// Same probability as a fraction in [0, 1]
    pub confidence_level: f64,
}

/// One sample of the position's value at expiration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub payoff: f64,
}

/// Output of the strikes -> zones -> probability pipeline.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StrategySummary {
    pub strategy: &'static str,
    pub underlying_price: f64,
    pub days_to_expiration: u32,
    pub volatility: f64,
    pub strikes: StrikeSet,
    pub profit_loss: ProfitLossZone,
    pub probability: ProbabilityMetrics,
    /// Payoff sampled evenly from 100 below the long put to 100 above the long call
    pub payoff: Vec<PayoffPoint>,
    pub analysis_date: DateTime<Local>,
}

// ── Full run, handed to the report writers ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub data_source: DataSource,
    pub risk_profile: String,
    pub price_stats: PriceStats,
    pub volatility: VolatilityMetrics,
    pub expected_move: ExpectedMove,
    pub summary: StrategySummary,
}
