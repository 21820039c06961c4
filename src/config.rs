use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::feeds::demo::MAX_DEMO_YEARS;
use crate::models::iron_condor::check_credit_fraction;
use crate::risk::profile::RiskProfile;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbol: String,
    pub history_range: String,
    pub market_data_base_url: String,
    pub use_demo_data: bool,
    pub days_to_expiration: u32,
    pub risk_profile: RiskProfile,
    pub credit_fraction: f64,
    pub percentile_lookback: usize,
    pub output_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> AnalyzerResult<Self> {
        dotenvy::dotenv().ok();

        let history_range = env_var_or("HISTORY_RANGE", "2y");
        // Demo data is sized in whole years, so the range must be too.
        history_years(&history_range)?;

        let use_demo_data = env_var_or("USE_DEMO_DATA", "false")
            .parse::<bool>()
            .map_err(|e| AnalyzerError::Config(format!("USE_DEMO_DATA: {e}")))?;

        let days_to_expiration = env_var_or("DAYS_TO_EXPIRATION", "45")
            .parse::<u32>()
            .map_err(|e| AnalyzerError::Config(format!("DAYS_TO_EXPIRATION: {e}")))?;
        if days_to_expiration == 0 {
            return Err(AnalyzerError::Config("DAYS_TO_EXPIRATION: must be > 0".into()));
        }

        let risk_profile = env_var_or("RISK_PROFILE", "moderate")
            .parse::<RiskProfile>()
            .map_err(|e| AnalyzerError::Config(format!("RISK_PROFILE: {e}")))?;

        let credit_fraction = env_var_or("CREDIT_FRACTION", "0.30")
            .parse::<f64>()
            .map_err(|e| AnalyzerError::Config(format!("CREDIT_FRACTION: {e}")))?;
        check_credit_fraction(credit_fraction).map_err(|e| AnalyzerError::Config(format!("CREDIT_FRACTION: {e}")))?;

        let percentile_lookback = parse_percentile_lookback(&env_var_or("PERCENTILE_LOOKBACK", "252"))?;

        Ok(Self {
            symbol: env_var_or("SYMBOL", "^GSPC"),
            history_range,
            market_data_base_url: env_var_or(
                "MARKET_DATA_BASE_URL",
                "https://query1.finance.yahoo.com",
            ),
            use_demo_data,
            days_to_expiration,
            risk_profile,
            credit_fraction,
            percentile_lookback,
            output_dir: PathBuf::from(env_var_or("OUTPUT_DIR", "output")),
        })
    }
}

/// Number of years in a range string like `"2y"`.
pub fn history_years(range: &str) -> AnalyzerResult<u32> {
    range
        .strip_suffix('y')
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= MAX_DEMO_YEARS)
        .ok_or_else(|| {
            AnalyzerError::Config(format!(
                "HISTORY_RANGE: expected 1y..={MAX_DEMO_YEARS}y, got {range:?}"
            ))
        })
}

fn parse_percentile_lookback(raw: &str) -> AnalyzerResult<usize> {
    let lookback = raw
        .parse::<usize>()
        .map_err(|e| AnalyzerError::Config(format!("PERCENTILE_LOOKBACK: {e}")))?;
    if lookback == 0 {
        return Err(AnalyzerError::Config("PERCENTILE_LOOKBACK: must be > 0".into()));
    }
    Ok(lookback)
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
