use crate::errors::AnalyzerResult;
use crate::models::iron_condor::one_sigma_move;
use crate::state::{ProbabilityMetrics, ProfitLossZone, StrikeSet};
use statrs::distribution::{ContinuousCDF, Normal};

/// Probability of finishing between the breakevens.
///
/// PoP = Phi(z_upper) - Phi(-z_lower)
///
/// where z_lower = (S - BE_lower) / sd, z_upper = (BE_upper - S) / sd
/// and sd = S * sigma * sqrt(dte / 365).
///
/// Terminal price is treated as normal around spot over the holding period.
/// Nothing here is fitted to a live option chain.
pub struct ProfitProbability {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl ProfitProbability {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    pub fn evaluate(
        &self,
        _strikes: &StrikeSet,
        zone: &ProfitLossZone,
        current_price: f64,
        volatility: f64,
        days_to_expiration: u32,
    ) -> AnalyzerResult<ProbabilityMetrics> {
        let std_dev = one_sigma_move(current_price, volatility, days_to_expiration)?;

        let lower_std_dev = (current_price - zone.breakeven_lower) / std_dev;
        let upper_std_dev = (zone.breakeven_upper - current_price) / std_dev;

        let prob_below_upper = self.normal.cdf(upper_std_dev);
        let prob_above_lower = 1.0 - self.normal.cdf(-lower_std_dev);
        // Breakevens are ordered so this is already in [0, 1]; clamp only trims rounding noise.
        let pop = (prob_below_upper + prob_above_lower - 1.0).clamp(0.0, 1.0);

        Ok(ProbabilityMetrics {
            probability_of_profit: pop * 100.0,
            lower_breakeven_std_dev: lower_std_dev,
            upper_breakeven_std_dev: upper_std_dev,
            confidence_level: pop,
        })
    }
}

impl Default for ProfitProbability {
    fn default() -> Self {
        Self::new()
    }
}

pub fn probability_of_profit(
    strikes: &StrikeSet,
    zone: &ProfitLossZone,
    current_price: f64,
    volatility: f64,
    days_to_expiration: u32,
) -> AnalyzerResult<ProbabilityMetrics> {
    ProfitProbability::new().evaluate(strikes, zone, current_price, volatility, days_to_expiration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalyzerError;
    use crate::models::iron_condor::{optimal_strikes, profit_loss_zones};

    fn evaluate(price: f64, vol: f64, dte: u32, wing: f64) -> ProbabilityMetrics {
        let s = optimal_strikes(price, vol, dte, wing, None).unwrap();
        let z = profit_loss_zones(&s);
        probability_of_profit(&s, &z, price, vol, dte).unwrap()
    }

    #[test]
    fn test_reference_pop() {
        let p = evaluate(4500.0, 0.18, 45, 50.0);
        let sd = 4500.0 * 0.18 * (45.0_f64 / 365.0).sqrt();
        assert!((p.lower_breakeven_std_dev - 310.0 / sd).abs() < 1e-9);
        assert!((p.upper_breakeven_std_dev - 310.0 / sd).abs() < 1e-9);
        // 2 * Phi(1.089) - 1
        assert!((p.probability_of_profit - 72.4).abs() < 0.2, "pop={}", p.probability_of_profit);
        assert!((p.confidence_level * 100.0 - p.probability_of_profit).abs() < 1e-12);
    }

    #[test]
    fn test_matches_cdf_difference() {
        let s = optimal_strikes(3900.0, 0.27, 30, 25.0, None).unwrap();
        let z = profit_loss_zones(&s);
        let p = probability_of_profit(&s, &z, 3900.0, 0.27, 30).unwrap();
        let n = Normal::standard();
        let direct = n.cdf(p.upper_breakeven_std_dev) - n.cdf(-p.lower_breakeven_std_dev);
        assert!((p.confidence_level - direct).abs() < 1e-12);
    }

    #[test]
    fn test_pop_bounds() {
        for &price in &[50.0, 450.0, 4500.0, 18_000.0] {
            for &vol in &[0.02, 0.15, 0.5, 1.5] {
                for &dte in &[1_u32, 14, 45, 365] {
                    for &wing in &[5.0, 50.0, 150.0] {
                        let p = evaluate(price, vol, dte, wing);
                        assert!(
                            (0.0..=100.0).contains(&p.probability_of_profit),
                            "pop={} for price={price} vol={vol} dte={dte} wing={wing}",
                            p.probability_of_profit
                        );
                        assert!((0.0..=1.0).contains(&p.confidence_level));
                    }
                }
            }
        }
    }

    #[test]
    fn test_higher_vol_lowers_pop_for_fixed_zone() {
        let s = optimal_strikes(4500.0, 0.18, 45, 50.0, None).unwrap();
        let z = profit_loss_zones(&s);
        let calm = probability_of_profit(&s, &z, 4500.0, 0.10, 45).unwrap();
        let wild = probability_of_profit(&s, &z, 4500.0, 0.40, 45).unwrap();
        assert!(calm.probability_of_profit > wild.probability_of_profit);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let s = optimal_strikes(4500.0, 0.18, 45, 50.0, None).unwrap();
        let z = profit_loss_zones(&s);
        assert!(matches!(
            probability_of_profit(&s, &z, 4500.0, 0.0, 45),
            Err(AnalyzerError::InvalidInput { param: "volatility", .. })
        ));
        assert!(probability_of_profit(&s, &z, 4500.0, 0.18, 0).is_err());
        assert!(probability_of_profit(&s, &z, -1.0, 0.18, 45).is_err());
    }
}
