use crate::state::AnalysisReport;

const RULE_WIDTH: usize = 80;

pub const ENTRY_RULES: [&str; 3] = [
    "Enter when volatility is in the moderate to elevated range",
    "Aim for 30-45 days to expiration for optimal time decay",
    "Target credit of 25-35% of the spread width",
];

pub const MANAGEMENT_RULES: [&str; 3] = [
    "Take profit at 50% of max profit",
    "Cut losses at 200% of credit received",
    "Consider rolling if 21 days remain and position is challenged",
];

pub const RISK_RULES: [&str; 3] = [
    "Never risk more than 2-5% of account on a single trade",
    "Monitor position daily for any breach of short strikes",
    "Have an exit plan before entering the trade",
];

pub const DISCLAIMER: &str = "DISCLAIMER: This analysis is for educational purposes only. \
Not financial advice. Trade at your own risk.";

/// Plain-text report, one section per stage of the analysis.
pub fn render_text(report: &AnalysisReport) -> String {
    let s = &report.summary;
    let k = &s.strikes;
    let pl = &s.profit_loss;
    let pr = &s.probability;
    let v = &report.volatility;

    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out: Vec<String> = Vec::with_capacity(96);

    out.push(heavy.clone());
    out.push(format!("{} IRON CONDOR ANALYSIS REPORT", report.symbol));
    out.push(heavy.clone());
    out.push(format!("Generated: {}", s.analysis_date.format("%Y-%m-%d %H:%M:%S")));
    out.push(format!("Data source: {}", report.data_source));
    out.push(format!("Risk profile: {}", report.risk_profile));

    section(&mut out, &light, "MARKET OVERVIEW");
    out.push(format!("Current Price: ${:.2}", s.underlying_price));
    out.push(format!("52-Week High: ${:.2}", report.price_stats.max_price));
    out.push(format!("52-Week Low: ${:.2}", report.price_stats.min_price));
    out.push(format!("Average Volume: {:.0}", report.price_stats.avg_volume));
    out.push(format!("Days to Expiration: {}", s.days_to_expiration));
    out.push(format!(
        "Expected Move: ${:.2} ({:.2}%)",
        k.expected_move, k.expected_move_pct
    ));

    section(&mut out, &light, "VOLATILITY ANALYSIS");
    out.push(format!("Current Volatility: {:.2}%", v.current_volatility * 100.0));
    out.push(format!("10-Day Volatility: {:.2}%", v.volatility_10d * 100.0));
    out.push(format!("30-Day Volatility: {:.2}%", v.volatility_30d * 100.0));
    out.push(format!("60-Day Volatility: {:.2}%", v.volatility_60d * 100.0));
    out.push(format!("Volatility Percentile: {:.1}%", v.volatility_percentile));
    out.push(format!("Volatility Regime: {}", v.volatility_regime));

    section(&mut out, &light, "IRON CONDOR STRATEGY");
    out.push("STRIKE PRICES (All 4 Legs):".into());
    out.push(format!("  1. Long Put (Buy):   ${:.0}", k.long_put));
    out.push(format!("  2. Short Put (Sell):  ${:.0}", k.short_put));
    out.push(format!("  3. Short Call (Sell): ${:.0}", k.short_call));
    out.push(format!("  4. Long Call (Buy):  ${:.0}", k.long_call));
    out.push(format!("Put Spread Width: ${:.0}", k.put_width()));
    out.push(format!("Call Spread Width: ${:.0}", k.call_width()));

    section(&mut out, &light, "PROFIT & LOSS ANALYSIS");
    out.push(format!("Estimated Credit Received: ${:.2}", pl.estimated_credit));
    out.push(format!("Maximum Profit: ${:.2}", pl.max_profit));
    out.push(format!("Maximum Loss: ${:.2}", pl.max_loss));
    out.push(format!("Return on Risk: {:.2}%", pl.return_on_risk));
    out.push(format!("Risk/Reward Ratio: {:.2}", pl.risk_reward_ratio));

    section(&mut out, &light, "BREAKEVEN ANALYSIS");
    out.push(format!("Lower Breakeven: ${:.2}", pl.breakeven_lower));
    out.push(format!("Upper Breakeven: ${:.2}", pl.breakeven_upper));
    out.push(format!(
        "Breakeven Range: ${:.2} ({:.2}%)",
        pl.profit_zone_width, pl.profit_zone_pct
    ));

    section(&mut out, &light, "PAYOFF AT EXPIRATION");
    out.push(format!("{:>12}  {:>10}", "Price", "P&L"));
    for p in &s.payoff {
        out.push(format!("{:>12.2}  {:>10.2}", p.price, p.payoff));
    }

    section(&mut out, &light, "PROBABILITY ANALYSIS");
    out.push(format!("Probability of Profit: {:.2}%", pr.probability_of_profit));
    out.push(format!("Confidence Level: {:.2}%", pr.confidence_level * 100.0));
    out.push(format!("Lower Breakeven (Std Dev): {:.2}", pr.lower_breakeven_std_dev));
    out.push(format!("Upper Breakeven (Std Dev): {:.2}", pr.upper_breakeven_std_dev));

    section(&mut out, &light, "TRADING RECOMMENDATIONS");
    bullets(&mut out, "ENTRY STRATEGY:", &ENTRY_RULES);
    bullets(&mut out, "MANAGEMENT RULES:", &MANAGEMENT_RULES);
    bullets(&mut out, "RISK MANAGEMENT:", &RISK_RULES);

    section(&mut out, &light, "CURRENT MARKET CONDITIONS");
    out.push(v.volatility_regime.assessment().into());
    for line in v.volatility_regime.recommendations() {
        out.push(format!("  - {line}"));
    }

    out.push(String::new());
    out.push(heavy.clone());
    out.push(DISCLAIMER.into());
    out.push(heavy);

    out.join("\n")
}

fn section(out: &mut Vec<String>, rule: &str, title: &str) {
    out.push(String::new());
    out.push(rule.to_string());
    out.push(title.to_string());
    out.push(rule.to_string());
}

fn bullets(out: &mut Vec<String>, heading: &str, items: &[&str]) {
    out.push(heading.to_string());
    for item in items {
        out.push(format!("  - {item}"));
    }
}
