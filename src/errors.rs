/// Domain-specific error types for the condor analyzer.
///
/// The quantitative core only ever raises the first three variants. The rest
/// belong to the glue around it (market data, config, report output).
/// No variant is ever replaced by a placeholder value on the way up.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("invalid input: {param} = {value} ({reason})")]
    InvalidInput {
        param: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("insufficient data: need {required} observations, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("undefined statistic: {0}")]
    UndefinedStatistic(String),

    #[error("model computation error: {0}")]
    Model(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("report error: {0}")]
    Report(String),
}

impl AnalyzerError {
    pub fn invalid(param: &'static str, value: impl std::fmt::Display, reason: &'static str) -> Self {
        AnalyzerError::InvalidInput {
            param,
            value: value.to_string(),
            reason,
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(e: reqwest::Error) -> Self {
        AnalyzerError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(e: serde_json::Error) -> Self {
        AnalyzerError::Parse(e.to_string())
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(e: csv::Error) -> Self {
        AnalyzerError::Report(e.to_string())
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(e: std::io::Error) -> Self {
        AnalyzerError::Report(e.to_string())
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Reject anything that is not a finite, strictly positive number.
#[inline]
pub fn require_positive(param: &'static str, value: f64) -> AnalyzerResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnalyzerError::invalid(param, value, "must be finite and > 0"))
    }
}
