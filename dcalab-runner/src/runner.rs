//! Analysis runner: wires together loading, fitting, classification, and simulation.
//!
//! Two entry points:
//! - `run_analysis()`: loads the series named in the config, then runs. Used by the CLI.
//! - `run_analysis_from_data()`: takes a pre-loaded series. No I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use dcalab_core::data::DataSource;
use dcalab_core::domain::{horizon_rows, AssetType, PriceSeries, SeriesError, ZoneEvent};
use dcalab_core::engine::{simulate, SimulationError, SimulationResult};
use dcalab_core::fit::{fit, FitError, FitResult, FitVariant};
use dcalab_core::forecast::{bitcoin_ath_forecast, AthForecast};
use dcalab_core::market::{summarize, MarketSummary};
use dcalab_core::signal::{classify, ClassifyError, Signal};
use dcalab_core::zones::{detect_buy_signals, detect_sell_signals};

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
use crate::optimizer::{optimize, OptimizationResult, OptimizeError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("fit error: {0}")]
    Fit(#[from] FitError),
    #[error("classification error: {0}")]
    Classify(#[from] ClassifyError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("optimizer error: {0}")]
    Optimize(#[from] OptimizeError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Fit parameters and outcome, without the full curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub requested_degree: usize,
    pub effective_degree: usize,
    pub variant: FitVariant,
    pub num_bands: usize,
    pub std_residuals: f64,
    pub last_baseline: f64,
}

/// Complete result of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_id: String,
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub bar_count: usize,
    pub dataset_hash: String,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub asset_type: AssetType,
    pub fit: FitSummary,
    /// Baseline and bands over the whole series.
    pub curves: FitResult,
    pub market: MarketSummary,
    pub signal: Signal,
    pub buy_events: Vec<ZoneEvent>,
    pub sell_events: Vec<ZoneEvent>,
    pub simulation: SimulationResult,
    pub bitcoin_forecast: Option<AthForecast>,
    pub optimization: Option<OptimizationResult>,
}

impl AnalysisReport {
    /// Most recent confirmed buy-zone crossing.
    pub fn latest_buy(&self) -> Option<&ZoneEvent> {
        self.buy_events.last()
    }

    /// Most recent confirmed sell-zone crossing.
    pub fn latest_sell(&self) -> Option<&ZoneEvent> {
        self.sell_events.last()
    }
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load the configured symbol, then analyze it.
pub fn run_analysis(
    config: &AnalysisConfig,
    opts: &LoadOptions,
    with_optimizer: bool,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let loaded = load_series(&config.analysis.symbol, opts)?;
    run_analysis_from_data(config, &loaded, with_optimizer)
}

/// Analyze a pre-loaded series. No I/O.
pub fn run_analysis_from_data(
    config: &AnalysisConfig,
    loaded: &LoadedSeries,
    with_optimizer: bool,
) -> Result<AnalysisReport, RunError> {
    let series = &loaded.series;
    let a = &config.analysis;
    info!(
        symbol = series.symbol(),
        rows = series.len(),
        degree = a.degree,
        variant = a.variant.name(),
        "running analysis"
    );

    let market = summarize(series)?;
    let curves = fit(&series.closes(), a.degree, a.num_bands, a.variant)?;
    let last_baseline = curves.baseline.last().unwrap_or_default();
    let bars = series.bars();

    let buy_events = detect_buy_signals(bars, &curves.bands);
    let sell_events = detect_sell_signals(bars, &curves.bands);

    let signal = classify(
        market.last_close,
        last_baseline,
        &curves.bands,
        bars,
        &config.active_zones(),
    )?;

    let simulation = simulate_horizon(config, series, &curves)?;

    let optimization = if with_optimizer {
        Some(optimize(
            series,
            &config.simulation_config(),
            &config.optimizer_config(),
        )?)
    } else {
        None
    };

    info!(
        signal = signal.headline(),
        roi = simulation.roi_percentage,
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        config_id: config.config_id()?,
        symbol: series.symbol().to_string(),
        start_date: series.first().map(|b| b.date.to_string()).unwrap_or_default(),
        end_date: series.last().map(|b| b.date.to_string()).unwrap_or_default(),
        bar_count: series.len(),
        dataset_hash: loaded.fingerprint.to_string(),
        source: loaded.source,
        has_synthetic: loaded.is_synthetic(),
        asset_type: config.asset_type(),
        fit: FitSummary {
            requested_degree: a.degree,
            effective_degree: curves.effective_degree(),
            variant: a.variant,
            num_bands: a.num_bands,
            std_residuals: curves.std_residuals,
            last_baseline,
        },
        bitcoin_forecast: bitcoin_ath_forecast(series.symbol(), market.last_close, bars),
        curves,
        market,
        signal,
        buy_events,
        sell_events,
        simulation,
        optimization,
    })
}

/// Simulate the last `252 × horizon_years` rows of `series` against `curves`.
pub fn simulate_horizon(
    config: &AnalysisConfig,
    series: &PriceSeries,
    curves: &FitResult,
) -> Result<SimulationResult, RunError> {
    let sim = config.simulation_config();
    let rows = horizon_rows(sim.horizon_years).min(series.len());
    let window = curves.tail(rows);
    Ok(simulate(
        series.tail(rows),
        &window.baseline.values,
        &window.bands,
        &sim,
    )?)
}
