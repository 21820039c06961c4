use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::state::{PriceSeries, StrategySummary};

#[derive(serde::Serialize)]
struct SummaryRow {
    #[serde(rename = "Analysis Date")]
    analysis_date: String,
    #[serde(rename = "Current Price")]
    current_price: f64,
    #[serde(rename = "DTE")]
    dte: u32,
    #[serde(rename = "Volatility")]
    volatility: f64,
    #[serde(rename = "Long Put")]
    long_put: f64,
    #[serde(rename = "Short Put")]
    short_put: f64,
    #[serde(rename = "Short Call")]
    short_call: f64,
    #[serde(rename = "Long Call")]
    long_call: f64,
    #[serde(rename = "Max Profit")]
    max_profit: f64,
    #[serde(rename = "Max Loss")]
    max_loss: f64,
    #[serde(rename = "PoP")]
    pop: f64,
}

/// date,open,high,low,close,volume, one row per bar.
pub fn render_price_csv(series: &PriceSeries) -> AnalyzerResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(series.len() * 64));
    for bar in series.bars() {
        wtr.serialize(bar)?;
    }
    finish(wtr)
}

/// Header plus a single summary row.
pub fn render_summary_csv(summary: &StrategySummary) -> AnalyzerResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.serialize(SummaryRow {
        analysis_date: summary.analysis_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        current_price: summary.underlying_price,
        dte: summary.days_to_expiration,
        volatility: summary.volatility,
        long_put: summary.strikes.long_put,
        short_put: summary.strikes.short_put,
        short_call: summary.strikes.short_call,
        long_call: summary.strikes.long_call,
        max_profit: summary.profit_loss.max_profit,
        max_loss: summary.profit_loss.max_loss,
        pop: summary.probability.probability_of_profit,
    })?;
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> AnalyzerResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| AnalyzerError::Report(format!("csv flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AnalyzerError::Report(format!("csv encoding: {e}")))
}
