use crate::errors::AnalyzerResult;
use crate::models::iron_condor::optimal_strikes;
use crate::state::StrikeSet;

/// Preset strike styles.
///
/// Each preset documents a target short-strike delta, but strikes are placed
/// at one expected move regardless, so only `wing_width` changes the output.
/// Conservative and moderate therefore produce identical strikes today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    /// Wider strikes, higher probability of profit
    Conservative,
    /// Balanced
    Moderate,
    /// Tighter strikes, more credit, lower probability
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    /// Target short put delta. Not consulted by the strike formula.
    pub put_delta: f64,
    /// Target short call delta. Not consulted by the strike formula.
    pub call_delta: f64,
    pub wing_width: f64,
}

impl RiskProfile {
    pub fn params(&self) -> ProfileParams {
        match self {
            Self::Conservative => ProfileParams {
                put_delta: 0.10,
                call_delta: 0.10,
                wing_width: 50.0,
            },
            Self::Moderate => ProfileParams {
                put_delta: 0.16,
                call_delta: 0.16,
                wing_width: 50.0,
            },
            Self::Aggressive => ProfileParams {
                put_delta: 0.25,
                call_delta: 0.25,
                wing_width: 25.0,
            },
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conservative => write!(f, "conservative"),
            Self::Moderate => write!(f, "moderate"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!("unknown risk profile {other:?}")),
        }
    }
}

/// Strikes for a preset. Default rounding increment for the price.
pub fn strikes_by_risk_profile(
    profile: RiskProfile,
    current_price: f64,
    volatility: f64,
    days_to_expiration: u32,
) -> AnalyzerResult<StrikeSet> {
    let params = profile.params();
    // TODO: solve short strikes from put_delta/call_delta once an option
    // pricing model backs strike selection; until then only wing_width applies.
    optimal_strikes(current_price, volatility, days_to_expiration, params.wing_width, None)
}
