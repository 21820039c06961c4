use crate::report::text::{DISCLAIMER, ENTRY_RULES, MANAGEMENT_RULES, RISK_RULES};
use crate::state::AnalysisReport;

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background-color: white; padding: 30px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
h1 { color: #2E86AB; border-bottom: 3px solid #2E86AB; padding-bottom: 10px; }
h2 { color: #333; background-color: #f0f0f0; padding: 10px; margin-top: 30px; }
.metric-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin: 20px 0; }
.metric-card { background-color: #f9f9f9; border-left: 4px solid #2E86AB; padding: 15px; border-radius: 4px; }
.metric-label { font-weight: bold; color: #666; font-size: 0.9em; }
.metric-value { font-size: 1.3em; color: #2E86AB; margin-top: 5px; }
.strike-table { width: 100%; border-collapse: collapse; margin: 20px 0; }
.strike-table th, .strike-table td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
.strike-table th { background-color: #2E86AB; color: white; }
.alert { padding: 15px; margin: 20px 0; border-radius: 4px; }
.alert-success { background-color: #d4edda; border-left: 4px solid #155724; color: #155724; }
.alert-warning { background-color: #fff3cd; border-left: 4px solid #856404; color: #856404; }
.footer { margin-top: 40px; font-size: 0.85em; color: #888; }
"#;

/// Standalone HTML page with the same content as the text report.
pub fn render_html(report: &AnalysisReport) -> String {
    let s = &report.summary;
    let k = &s.strikes;
    let pl = &s.profit_loss;
    let pr = &s.probability;
    let v = &report.volatility;
    let symbol = escape(&report.symbol);

    let mut body = String::with_capacity(8 * 1024);

    body.push_str(&format!("<h1>{symbol} Iron Condor Analysis</h1>\n"));
    body.push_str(&format!(
        "<p>Generated: {} &middot; Data source: {} &middot; Risk profile: {}</p>\n",
        s.analysis_date.format("%Y-%m-%d %H:%M:%S"),
        report.data_source,
        escape(&report.risk_profile)
    ));

    body.push_str("<h2>Market Overview</h2>\n");
    body.push_str(&metric_grid(&[
        ("Current Price", format!("${:.2}", s.underlying_price)),
        ("Days to Expiration", s.days_to_expiration.to_string()),
        ("Expected Move", format!("${:.2} ({:.2}%)", k.expected_move, k.expected_move_pct)),
        ("52-Week Range", format!("${:.2} - ${:.2}", report.price_stats.min_price, report.price_stats.max_price)),
    ]));

    body.push_str("<h2>Volatility Analysis</h2>\n");
    body.push_str(&metric_grid(&[
        ("Current Volatility", format!("{:.2}%", v.current_volatility * 100.0)),
        ("10-Day Volatility", format!("{:.2}%", v.volatility_10d * 100.0)),
        ("30-Day Volatility", format!("{:.2}%", v.volatility_30d * 100.0)),
        ("60-Day Volatility", format!("{:.2}%", v.volatility_60d * 100.0)),
        ("Volatility Percentile", format!("{:.1}%", v.volatility_percentile)),
        ("Volatility Regime", v.volatility_regime.to_string()),
    ]));

    body.push_str("<h2>Strike Prices</h2>\n<table class=\"strike-table\">\n");
    body.push_str("<tr><th>Leg</th><th>Action</th><th>Strike</th></tr>\n");
    for (leg, action, strike) in [
        ("Long Put", "Buy", k.long_put),
        ("Short Put", "Sell", k.short_put),
        ("Short Call", "Sell", k.short_call),
        ("Long Call", "Buy", k.long_call),
    ] {
        body.push_str(&format!("<tr><td>{leg}</td><td>{action}</td><td>${strike:.0}</td></tr>\n"));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Profit &amp; Loss</h2>\n");
    body.push_str(&metric_grid(&[
        ("Estimated Credit", format!("${:.2}", pl.estimated_credit)),
        ("Max Profit", format!("${:.2}", pl.max_profit)),
        ("Max Loss", format!("${:.2}", pl.max_loss)),
        ("Return on Risk", format!("{:.2}%", pl.return_on_risk)),
        ("Risk/Reward Ratio", format!("{:.2}", pl.risk_reward_ratio)),
        ("Breakevens", format!("${:.2} - ${:.2}", pl.breakeven_lower, pl.breakeven_upper)),
        ("Profit Zone", format!("${:.2} ({:.2}%)", pl.profit_zone_width, pl.profit_zone_pct)),
        ("Probability of Profit", format!("{:.2}%", pr.probability_of_profit)),
    ]));

    body.push_str("<h2>Payoff at Expiration</h2>\n<table class=\"strike-table\">\n");
    body.push_str("<tr><th>Underlying Price</th><th>P&amp;L</th></tr>\n");
    for p in &s.payoff {
        body.push_str(&format!("<tr><td>${:.2}</td><td>${:.2}</td></tr>\n", p.price, p.payoff));
    }
    body.push_str("</table>\n");

    let alert_class = if v.volatility_regime.favors_condors() {
        "alert-success"
    } else {
        "alert-warning"
    };
    body.push_str("<h2>Market Conditions</h2>\n");
    body.push_str(&format!(
        "<div class=\"alert {alert_class}\"><strong>{}</strong>{}</div>\n",
        escape(v.volatility_regime.assessment()),
        list(v.volatility_regime.recommendations())
    ));

    body.push_str("<h2>Trading Recommendations</h2>\n");
    body.push_str("<h3>Entry Strategy</h3>\n");
    body.push_str(&list(&ENTRY_RULES));
    body.push_str("<h3>Management Rules</h3>\n");
    body.push_str(&list(&MANAGEMENT_RULES));
    body.push_str("<h3>Risk Management</h3>\n");
    body.push_str(&list(&RISK_RULES));

    body.push_str(&format!("<p class=\"footer\">{}</p>\n", escape(DISCLAIMER)));

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{symbol} Iron Condor Analysis</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n{body}</div>\n</body>\n</html>\n"
    )
}

fn metric_grid(cards: &[(&str, String)]) -> String {
    let mut out = String::from("<div class=\"metric-grid\">\n");
    for (label, value) in cards {
        out.push_str(&format!(
            "<div class=\"metric-card\"><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>\n",
            escape(label),
            escape(value)
        ));
    }
    out.push_str("</div>\n");
    out
}

fn list(items: &[&str]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str(&format!("<li>{}</li>", escape(item)));
    }
    out.push_str("</ul>\n");
    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_html_contains_strikes_and_escapes() {
        let mut report = sample_report();
        report.symbol = "<S&P>".into();
        let html = render_html(&report);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;S&amp;P&gt; Iron Condor Analysis"));
        assert!(!html.contains("<S&P>"));
        assert!(html.contains("<td>Short Put</td><td>Sell</td><td>$4220</td>"));
        assert!(html.contains("class=\"alert alert-success\""));
        assert!(html.contains("<h2>Payoff at Expiration</h2>"));
        assert!(html.contains("<tr><td>$4070.00</td><td>$-20.00</td></tr>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
