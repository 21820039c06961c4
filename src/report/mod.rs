pub mod csv_export;
pub mod html;
pub mod text;

use crate::errors::AnalyzerResult;
use crate::state::{AnalysisReport, PriceSeries};
use std::path::{Path, PathBuf};

/// Where each artifact of a run was written.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub text: PathBuf,
    pub html: PathBuf,
    pub price_csv: PathBuf,
    pub summary_csv: PathBuf,
    pub json: PathBuf,
}

/// Render every report for a run and write them under `output_dir`.
pub fn write_reports(output_dir: &Path, report: &AnalysisReport, series: &PriceSeries) -> AnalyzerResult<ReportPaths> {
    std::fs::create_dir_all(output_dir)?;

    let paths = ReportPaths {
        text: output_dir.join("iron_condor_report.txt"),
        html: output_dir.join("iron_condor_report.html"),
        price_csv: output_dir.join("strategy_data.csv"),
        summary_csv: output_dir.join("strategy_summary.csv"),
        json: output_dir.join("iron_condor_analysis.json"),
    };

    std::fs::write(&paths.text, text::render_text(report))?;
    std::fs::write(&paths.html, html::render_html(report))?;
    std::fs::write(&paths.price_csv, csv_export::render_price_csv(series)?)?;
    std::fs::write(&paths.summary_csv, csv_export::render_summary_csv(&report.summary)?)?;
    std::fs::write(&paths.json, serde_json::to_string_pretty(report)?)?;

    tracing::info!(dir = %output_dir.display(), "reports written");
    Ok(paths)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::iron_condor::{build_summary, optimal_strikes, DEFAULT_CREDIT_FRACTION};
    use crate::state::{
        DataSource, ExpectedMove, PriceBar, PriceStats, VolRegime, VolatilityMetrics,
    };
    use chrono::{Local, NaiveDate};

    pub(crate) fn sample_series() -> PriceSeries {
        let rows = [
            (2, 4745.2, 4754.3, 4722.7, 4742.8, 3_743_050_000),
            (3, 4725.1, 4729.3, 4699.7, 4704.8, 3_950_760_000),
            (4, 4697.4, 4726.8, 4687.5, 4688.7, 3_715_480_000),
            (5, 4690.6, 4721.5, 4682.1, 4697.2, 3_844_370_000),
        ];
        let bars = rows
            .iter()
            .map(|&(day, open, high, low, close, volume)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open,
                high,
                low,
                close,
                volume,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    pub(crate) fn sample_report() -> AnalysisReport {
        let strikes = optimal_strikes(4500.0, 0.18, 45, 50.0, None).unwrap();
        let summary = build_summary(strikes, 0.18, 45, DEFAULT_CREDIT_FRACTION, Local::now()).unwrap();
        AnalysisReport {
            symbol: "^GSPC".into(),
            data_source: DataSource::Demo,
            risk_profile: "moderate".into(),
            price_stats: PriceStats::compute(&sample_series()),
            volatility: VolatilityMetrics {
                current_volatility: 0.18,
                volatility_10d: 0.15,
                volatility_30d: 0.18,
                volatility_60d: 0.17,
                volatility_percentile: 55.0,
                volatility_regime: VolRegime::Moderate,
            },
            expected_move: ExpectedMove {
                expected_move: strikes.expected_move,
                upper_range: 4500.0 + strikes.expected_move,
                lower_range: 4500.0 - strikes.expected_move,
                percentage: strikes.expected_move_pct,
            },
            summary,
        }
    }

    #[test]
    fn test_write_reports() {
        let tmp = tempfile::tempdir().unwrap();
        // Nested so create_dir_all is exercised too.
        let dir = tmp.path().join("output");
        let report = sample_report();
        let paths = write_reports(&dir, &report, &sample_series()).unwrap();

        for p in [&paths.text, &paths.html, &paths.price_csv, &paths.summary_csv, &paths.json] {
            let meta = std::fs::metadata(p).unwrap();
            assert!(meta.len() > 0, "{} is empty", p.display());
        }

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["summary"]["strikes"]["short_put"], 4220.0);
        assert_eq!(json["volatility"]["volatility_regime"], "MODERATE");
        assert_eq!(json["data_source"], "demo");
        assert_eq!(json["summary"]["payoff"][0]["payoff"], -20.0);
    }
}
