use condor_rusty::config::{self, AppConfig};
use condor_rusty::errors::AnalyzerResult;
use condor_rusty::feeds;
use condor_rusty::models::iron_condor::{build_summary, expected_move};
use condor_rusty::models::volatility::volatility_metrics_with_lookback;
use condor_rusty::report;
use condor_rusty::risk::profile::strikes_by_risk_profile;
use condor_rusty::state::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("condor_rusty starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cfg).await {
        tracing::error!(error = %e, "analysis failed");
        std::process::exit(1);
    }

    tracing::info!("analysis completed");
}

async fn run(cfg: &AppConfig) -> AnalyzerResult<()> {
    // ── 1. Price history ──
    let (series, data_source) = load_series(cfg).await?;
    let price_stats = PriceStats::compute(&series);
    let current_price = series.last_close();

    // ── 2. Volatility ──
    let volatility = volatility_metrics_with_lookback(&series, cfg.percentile_lookback)?;
    tracing::info!(
        current = volatility.current_volatility,
        percentile = volatility.volatility_percentile,
        regime = %volatility.volatility_regime,
        "volatility computed"
    );

    // ── 3. Strikes -> P&L -> probability ──
    let strikes = strikes_by_risk_profile(
        cfg.risk_profile,
        current_price,
        volatility.current_volatility,
        cfg.days_to_expiration,
    )?;
    let summary = build_summary(
        strikes,
        volatility.current_volatility,
        cfg.days_to_expiration,
        cfg.credit_fraction,
        chrono::Local::now(),
    )?;
    let expected_move = expected_move(current_price, cfg.days_to_expiration, volatility.current_volatility)?;

    tracing::info!(
        long_put = strikes.long_put,
        short_put = strikes.short_put,
        short_call = strikes.short_call,
        long_call = strikes.long_call,
        pop = summary.probability.probability_of_profit,
        "strategy computed"
    );

    let analysis = AnalysisReport {
        symbol: cfg.symbol.clone(),
        data_source,
        risk_profile: cfg.risk_profile.to_string(),
        price_stats,
        volatility,
        expected_move,
        summary,
    };

    // ── 4. Reports ──
    let paths = report::write_reports(&cfg.output_dir, &analysis, &series)?;

    print_console_summary(&analysis, series.len());
    println!("Reports:");
    for p in [&paths.text, &paths.html, &paths.price_csv, &paths.summary_csv, &paths.json] {
        println!("  {}", p.display());
    }
    println!("\n{}", report::text::DISCLAIMER);

    Ok(())
}

/// Live history unless demo data is forced; any live failure falls back to
/// demo data. The analysis treats both identically.
async fn load_series(cfg: &AppConfig) -> AnalyzerResult<(PriceSeries, DataSource)> {
    if !cfg.use_demo_data {
        match feeds::market_data::fetch_price_history(cfg).await {
            Ok(series) => return Ok((series, DataSource::Live)),
            Err(e) => {
                tracing::warn!(error = %e, "live market data unavailable, using demo data");
            }
        }
    }

    let years = config::history_years(&cfg.history_range)?;
    let series = feeds::demo::generate_demo_series(
        years,
        chrono::Local::now().date_naive(),
        feeds::demo::DEMO_SEED,
    )?;
    Ok((series, DataSource::Demo))
}

fn print_console_summary(report: &AnalysisReport, bars: usize) {
    let s = &report.summary;
    let k = &s.strikes;
    let pl = &s.profit_loss;
    let v = &report.volatility;
    let rule = "=".repeat(70);

    println!("{rule}");
    println!("{} IRON CONDOR ({} data, {} bars)", report.symbol, report.data_source, bars);
    println!("{rule}");
    println!("Current Price:          ${:.2}", s.underlying_price);
    println!("52-Week High / Low:     ${:.2} / ${:.2}", report.price_stats.max_price, report.price_stats.min_price);
    println!("Current Volatility:     {:.2}%", v.current_volatility * 100.0);
    println!("Volatility Percentile:  {:.1}%", v.volatility_percentile);
    println!("Volatility Regime:      {}", v.volatility_regime);
    println!();
    println!("Long Put (Buy):         ${:.0}", k.long_put);
    println!("Short Put (Sell):       ${:.0}", k.short_put);
    println!("Short Call (Sell):      ${:.0}", k.short_call);
    println!("Long Call (Buy):        ${:.0}", k.long_call);
    println!();
    println!("Max Profit:             ${:.2}", pl.max_profit);
    println!("Max Loss:               ${:.2}", pl.max_loss);
    println!("Return on Risk:         {:.2}%", pl.return_on_risk);
    println!("Probability of Profit:  {:.2}%", s.probability.probability_of_profit);
    println!("Breakevens:             ${:.2} - ${:.2}", pl.breakeven_lower, pl.breakeven_upper);
    println!();
    println!("{}", v.volatility_regime.assessment());
    for line in v.volatility_regime.recommendations() {
        println!("  - {line}");
    }
    println!("{rule}");
}
