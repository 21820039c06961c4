use crate::errors::{require_positive, AnalyzerError, AnalyzerResult};
use crate::models::probability::ProfitProbability;
use crate::state::{ExpectedMove, PayoffPoint, ProfitLossZone, StrategySummary, StrikeSet};
use chrono::{DateTime, Local};

/// Calendar days per year for the expected-move horizon
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Distance between each short strike and its protective long strike
pub const DEFAULT_WING_WIDTH: f64 = 50.0;

/// Credit per wing as a fraction of its width. A heuristic, not a quote.
pub const DEFAULT_CREDIT_FRACTION: f64 = 0.30;

/// How far past each long strike the payoff table extends
pub const PAYOFF_PADDING: f64 = 100.0;

/// Rows in the payoff table carried by a summary
pub const PAYOFF_TABLE_POINTS: usize = 21;

/// Above this price strikes are listed every 10 points, below it every 5.
const WIDE_INCREMENT_PRICE: f64 = 2000.0;

#[inline]
pub fn default_rounding_increment(current_price: f64) -> f64 {
    if current_price < WIDE_INCREMENT_PRICE {
        5.0
    } else {
        10.0
    }
}

/// One standard deviation of price over the holding period:
/// S * sigma * sqrt(dte / 365).
///
/// Strike placement and PoP both go through here so they agree exactly.
pub fn one_sigma_move(current_price: f64, volatility: f64, days_to_expiration: u32) -> AnalyzerResult<f64> {
    require_positive("current_price", current_price)?;
    require_positive("volatility", volatility)?;
    if days_to_expiration == 0 {
        return Err(AnalyzerError::invalid("days_to_expiration", 0, "must be > 0"));
    }
    Ok(current_price * volatility * (days_to_expiration as f64 / CALENDAR_DAYS_PER_YEAR).sqrt())
}

pub fn expected_move(current_price: f64, days_to_expiration: u32, volatility: f64) -> AnalyzerResult<ExpectedMove> {
    let mv = one_sigma_move(current_price, volatility, days_to_expiration)?;
    Ok(ExpectedMove {
        expected_move: mv,
        upper_range: current_price + mv,
        lower_range: current_price - mv,
        percentage: mv / current_price * 100.0,
    })
}

/// Round to the nearest multiple of `increment`, ties away from zero.
#[inline]
pub fn round_strike(price: f64, increment: f64) -> f64 {
    (price / increment).round() * increment
}

/// Place the four legs one expected move either side of spot.
///
/// The one-sigma short strikes stand in for ~16 delta; there is no delta
/// solve against a pricing model. After rounding, a long strike that
/// collapsed onto its short is pushed out one increment.
pub fn optimal_strikes(
    current_price: f64,
    volatility: f64,
    days_to_expiration: u32,
    wing_width: f64,
    rounding_increment: Option<f64>,
) -> AnalyzerResult<StrikeSet> {
    let mv = one_sigma_move(current_price, volatility, days_to_expiration)?;
    require_positive("wing_width", wing_width)?;
    let inc = match rounding_increment {
        Some(inc) => require_positive("rounding_increment", inc)?,
        None => default_rounding_increment(current_price),
    };

    let short_put_raw = current_price - mv;
    let short_call_raw = current_price + mv;

    let short_put = round_strike(short_put_raw, inc);
    let short_call = round_strike(short_call_raw, inc);

    let mut long_put = round_strike(short_put_raw - wing_width, inc);
    if long_put >= short_put {
        long_put = short_put - inc;
    }
    let mut long_call = round_strike(short_call_raw + wing_width, inc);
    if long_call <= short_call {
        long_call = short_call + inc;
    }

    let strikes = StrikeSet {
        long_put,
        short_put,
        short_call,
        long_call,
        current_price,
        expected_move: mv,
        expected_move_pct: mv / current_price * 100.0,
    };

    tracing::debug!(
        long_put,
        short_put,
        short_call,
        long_call,
        expected_move = mv,
        "iron condor strikes"
    );

    Ok(strikes)
}

/// P&L zone at the default 30% credit.
pub fn profit_loss_zones(strikes: &StrikeSet) -> ProfitLossZone {
    zones_for(strikes, DEFAULT_CREDIT_FRACTION)
}

pub fn profit_loss_zones_with_credit(strikes: &StrikeSet, credit_fraction: f64) -> AnalyzerResult<ProfitLossZone> {
    check_credit_fraction(credit_fraction)?;
    Ok(zones_for(strikes, credit_fraction))
}

/// Value of the position at expiration if the underlying settles at `price`.
///
/// Flat at `-max_loss` outside the long strikes, flat at the credit between
/// the shorts, linear across each wing.
pub fn payoff_at_expiration(strikes: &StrikeSet, zone: &ProfitLossZone, price: f64) -> f64 {
    let credit = zone.estimated_credit;
    if price <= strikes.long_put {
        -zone.max_loss
    } else if price < strikes.short_put {
        (price - strikes.short_put) + credit
    } else if price <= strikes.short_call {
        credit
    } else if price < strikes.long_call {
        (strikes.short_call - price) + credit
    } else {
        -zone.max_loss
    }
}

/// `points` evenly spaced payoffs over
/// `[long_put - PAYOFF_PADDING, long_call + PAYOFF_PADDING]`, both ends included.
pub fn payoff_table(strikes: &StrikeSet, zone: &ProfitLossZone, points: usize) -> AnalyzerResult<Vec<PayoffPoint>> {
    if points < 2 {
        return Err(AnalyzerError::invalid("points", points, "need at least 2 samples"));
    }
    let lo = strikes.long_put - PAYOFF_PADDING;
    let hi = strikes.long_call + PAYOFF_PADDING;
    let step = (hi - lo) / (points - 1) as f64;

    Ok((0..points)
        .map(|i| {
            // Pin the last sample so float drift cannot undershoot the range.
            let price = if i == points - 1 { hi } else { lo + step * i as f64 };
            PayoffPoint {
                price,
                payoff: payoff_at_expiration(strikes, zone, price),
            }
        })
        .collect())
}

/// strikes -> zones -> probability, each stage fed the previous one's output.
pub fn build_summary(
    strikes: StrikeSet,
    volatility: f64,
    days_to_expiration: u32,
    credit_fraction: f64,
    analysis_date: DateTime<Local>,
) -> AnalyzerResult<StrategySummary> {
    let profit_loss = profit_loss_zones_with_credit(&strikes, credit_fraction)?;
    let probability = ProfitProbability::new().evaluate(
        &strikes,
        &profit_loss,
        strikes.current_price,
        volatility,
        days_to_expiration,
    )?;
    let payoff = payoff_table(&strikes, &profit_loss, PAYOFF_TABLE_POINTS)?;

    Ok(StrategySummary {
        strategy: "Iron Condor",
        underlying_price: strikes.current_price,
        days_to_expiration,
        volatility,
        strikes,
        profit_loss,
        probability,
        payoff,
        analysis_date,
    })
}

fn zones_for(strikes: &StrikeSet, credit_fraction: f64) -> ProfitLossZone {
    let put_width = strikes.put_width();
    let call_width = strikes.call_width();

    let estimated_credit = credit_fraction * put_width + credit_fraction * call_width;
    let max_profit = estimated_credit;
    // Only one side can finish in the money, so the worse wing sets the loss.
    let max_loss = (put_width - estimated_credit).max(call_width - estimated_credit);

    let breakeven_lower = strikes.short_put - estimated_credit;
    let breakeven_upper = strikes.short_call + estimated_credit;
    let profit_zone_width = breakeven_upper - breakeven_lower;

    ProfitLossZone {
        max_profit,
        max_loss,
        estimated_credit,
        breakeven_lower,
        breakeven_upper,
        profit_zone_width,
        profit_zone_pct: profit_zone_width / strikes.current_price * 100.0,
        risk_reward_ratio: if max_profit > 0.0 { max_loss / max_profit } else { 0.0 },
        return_on_risk: if max_loss > 0.0 { max_profit / max_loss * 100.0 } else { 0.0 },
    }
}

/// Above one half the credit would exceed the narrower wing's risk and max
/// loss could go negative.
pub fn check_credit_fraction(credit_fraction: f64) -> AnalyzerResult<()> {
    if credit_fraction.is_finite() && credit_fraction > 0.0 && credit_fraction <= 0.5 {
        Ok(())
    } else {
        Err(AnalyzerError::invalid("credit_fraction", credit_fraction, "must be in (0, 0.5]"))
    }
}
