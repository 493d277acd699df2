//! DcaLab CLI: analyze, simulate, and optimize commands.
//!
//! Commands:
//! - `analyze`: fit the baseline and bands, classify the latest bar, simulate
//! - `simulate`: run only the DCA backtest over the configured horizon
//! - `optimize`: sweep polynomial degrees and report the best ROI

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dcalab_core::data::DateRange;
use dcalab_core::engine::{DcaStrategy, SimulationResult};
use dcalab_core::fit::FitVariant;
use dcalab_runner::runner::simulate_horizon;
use dcalab_runner::{
    load_series, optimize, run_analysis_from_data, save_artifacts, AnalysisConfig,
    AnalysisReport, LoadOptions, OptimizationResult,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dcalab",
    about = "DcaLab CLI: regression-band DCA decision support"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit bands, classify the latest bar, and simulate the DCA strategy.
    Analyze {
        #[command(flatten)]
        common: CommonArgs,

        /// Also sweep degrees with the intensity optimizer.
        #[arg(long, default_value_t = false)]
        optimize: bool,

        /// Write report.json and CSV ledgers under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run only the DCA backtest.
    Simulate {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Sweep degrees and pick the one with the best simulated ROI.
    Optimize {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long)]
        min_degree: Option<usize>,

        #[arg(long)]
        max_degree: Option<usize>,

        #[arg(long)]
        step: Option<usize>,

        /// Evaluate candidates one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to a TOML analysis config. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker symbol (e.g., AAPL, BTC-USD).
    #[arg(long)]
    symbol: Option<String>,

    /// CSV file, or a directory of `{SYMBOL}.csv` files.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use deterministic synthetic prices.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Polynomial degree (intensity).
    #[arg(long)]
    degree: Option<usize>,

    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Total DCA budget in dollars.
    #[arg(long)]
    budget: Option<f64>,

    /// Simulation horizon in years.
    #[arg(long)]
    horizon: Option<f64>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Active take-profit levels, comma separated (e.g., 2,3,4).
    #[arg(long, value_delimiter = ',')]
    zones: Option<Vec<usize>>,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Simple,
    Enhanced,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Simplified,
    ZoneMultiplier,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            common,
            optimize,
            output_dir,
        } => run_analyze_cmd(common, optimize, output_dir),
        Commands::Simulate { common } => run_simulate_cmd(common),
        Commands::Optimize {
            common,
            min_degree,
            max_degree,
            step,
            sequential,
        } => run_optimize_cmd(common, min_degree, max_degree, step, sequential),
    }
}

// ─── Config assembly ────────────────────────────────────────────────

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    Ok(value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?)
}

fn build_config(common: &CommonArgs) -> Result<AnalysisConfig> {
    let mut config = match &common.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(symbol) = &common.symbol {
        config.analysis.symbol = symbol.to_uppercase();
    }
    if let Some(degree) = common.degree {
        config.analysis.degree = degree;
    }
    if let Some(variant) = common.variant {
        config.analysis.variant = match variant {
            VariantArg::Simple => FitVariant::Simple,
            VariantArg::Enhanced => FitVariant::Enhanced,
        };
    }
    if let Some(zones) = &common.zones {
        config.analysis.active_zones = zones.clone();
    }
    if let Some(budget) = common.budget {
        config.simulation.budget = budget;
    }
    if let Some(horizon) = common.horizon {
        config.simulation.horizon_years = horizon;
    }
    if let Some(strategy) = common.strategy {
        config.simulation.strategy = match strategy {
            StrategyArg::Simplified => DcaStrategy::Simplified,
            StrategyArg::ZoneMultiplier => DcaStrategy::ZoneMultiplier,
        };
    }

    config.validate()?;
    Ok(config)
}

fn build_load_options(common: &CommonArgs) -> Result<LoadOptions> {
    if common.csv.is_none() && !common.synthetic {
        bail!("one of --csv or --synthetic is required");
    }
    let range = DateRange {
        start: parse_date(common.start.as_deref())?,
        end: parse_date(common.end.as_deref())?,
    };
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            bail!("--start {start} is after --end {end}");
        }
    }
    Ok(LoadOptions {
        range,
        csv: common.csv.clone(),
        synthetic: common.synthetic,
    })
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_analyze_cmd(common: CommonArgs, with_optimizer: bool, output_dir: Option<PathBuf>) -> Result<()> {
    let config = build_config(&common)?;
    let opts = build_load_options(&common)?;
    let loaded = load_series(&config.analysis.symbol, &opts)?;
    let report = run_analysis_from_data(&config, &loaded, with_optimizer)?;

    print_report(&report);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_simulate_cmd(common: CommonArgs) -> Result<()> {
    let config = build_config(&common)?;
    let opts = build_load_options(&common)?;
    let loaded = load_series(&config.analysis.symbol, &opts)?;
    let a = &config.analysis;
    let curves = dcalab_core::fit(&loaded.series.closes(), a.degree, a.num_bands, a.variant)?;
    let result = simulate_horizon(&config, &loaded.series, &curves)?;

    println!();
    println!("=== DCA Simulation: {} ===", a.symbol);
    print_simulation(&result);
    if loaded.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
    Ok(())
}

fn run_optimize_cmd(
    common: CommonArgs,
    min_degree: Option<usize>,
    max_degree: Option<usize>,
    step: Option<usize>,
    sequential: bool,
) -> Result<()> {
    let mut config = build_config(&common)?;
    if let Some(v) = min_degree {
        config.optimizer.min_degree = v;
    }
    if let Some(v) = max_degree {
        config.optimizer.max_degree = v;
    }
    if let Some(v) = step {
        config.optimizer.step = v;
    }
    if sequential {
        config.optimizer.parallel = false;
    }
    config.validate()?;

    let opts = build_load_options(&common)?;
    let loaded = load_series(&config.analysis.symbol, &opts)?;
    let result = optimize(
        &loaded.series,
        &config.simulation_config(),
        &config.optimizer_config(),
    )?;

    println!();
    println!("=== Intensity Optimization: {} ===", config.analysis.symbol);
    print_optimization(&result);
    println!();
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_report(report: &AnalysisReport) {
    let m = &report.signal.metrics;
    println!();
    println!("=== DCA Analysis: {} ===", report.symbol);
    println!(
        "Period:         {} to {} ({} bars)",
        report.start_date, report.end_date, report.bar_count
    );
    println!(
        "Fit:            {} degree {} (effective {}), {} bands",
        report.fit.variant.name(),
        report.fit.requested_degree,
        report.fit.effective_degree,
        report.fit.num_bands
    );
    println!("Last Close:     {:.2}", report.market.last_close);
    println!("Baseline:       {:.2}", report.fit.last_baseline);
    for change in &report.market.changes {
        println!(
            "  {:<4} {:>+10.2} ({:>+6.2}%)",
            change.window.label(),
            change.absolute,
            change.percent
        );
    }
    println!(
        "52W Range:      {:.2} to {:.2}",
        report.market.week52_low, report.market.week52_high
    );

    println!();
    println!("--- Signal: {} ---", report.signal.headline());
    println!("{}", report.signal.description);
    println!("{}", report.signal.recommendation);
    println!("From baseline:  {:+.2}%", m.distance_from_baseline_pct);
    println!("Momentum (5d):  {:+.2}%", m.momentum_pct);

    if let Some(event) = report.latest_buy() {
        println!("Last buy zone:  L{} on {} at {:.2}", event.zone_level, event.date, event.price);
    }
    if let Some(event) = report.latest_sell() {
        println!("Last TP zone:   L{} on {} at {:.2}", event.zone_level, event.date, event.price);
    }

    println!();
    println!("--- Simulation ---");
    print_simulation(&report.simulation);

    if let Some(forecast) = &report.bitcoin_forecast {
        println!();
        println!("--- Cycle ATH Projection ---");
        for (label, p) in [
            ("Conservative", &forecast.conservative),
            ("Base", &forecast.base),
            ("Optimistic", &forecast.optimistic),
        ] {
            println!("{label:<15} {:>12.0} ({:.2}x)", p.price, p.multiplier);
        }
        println!("Progress:       {:.1}% of base", forecast.progress_pct);
    }

    if let Some(optimization) = &report.optimization {
        println!();
        println!("--- Intensity Optimization ---");
        print_optimization(optimization);
    }

    if report.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_simulation(result: &SimulationResult) {
    println!(
        "Horizon:        {} years ({} trading days)",
        result.horizon_years, result.trading_days
    );
    println!("Daily DCA:      ${:.2}", result.daily_dca_amount);
    println!("Invested:       ${:.2}", result.total_invested);
    println!("Realized Cash:  ${:.2}", result.realized_cash);
    println!("Holdings Value: ${:.2}", result.current_value);
    if result.dividend_income > 0.0 {
        println!("Dividends:      ${:.2}", result.dividend_income);
    }
    println!("Total Return:   ${:.2}", result.total_return);
    println!("ROI:            {:.2}%", result.roi_percentage);
    println!(
        "Buys:           {} daily, {} zone",
        result.daily_buy_count, result.zone_buy_count
    );
    println!("Sells:          {}", result.sell_count);
    if let Some(tp) = &result.next_tp {
        println!("Next TP:        L{} at {:.2}", tp.level, tp.price);
    }
}

fn print_optimization(result: &OptimizationResult) {
    println!(
        "{:>6} {:>9} {:>10} {:>12} {:>7} {:>6}",
        "Degree", "Effective", "ROI %", "Invested", "Zone", "Sells"
    );
    println!("{}", "-".repeat(56));
    for r in &result.all_results {
        let marker = if r.degree == result.optimal_degree { "*" } else { " " };
        println!(
            "{:>5}{marker} {:>9} {:>10.2} {:>12.2} {:>7} {:>6}",
            r.degree,
            r.effective_degree,
            r.roi_percentage,
            r.total_invested,
            r.zone_buy_count,
            r.sell_count
        );
    }
    for s in &result.skipped {
        println!("Skipped degree {}: {}", s.degree, s.reason);
    }
    if result.is_exhausted() {
        println!("No viable intensity found.");
    } else {
        println!(
            "Optimal degree: {} (ROI {:.2}%)",
            result.optimal_degree, result.best_roi
        );
    }
}
