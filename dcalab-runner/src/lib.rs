//! DcaLab Runner: analysis orchestration, intensity optimizer, data loading, export.
//!
//! This crate builds on `dcalab-core` to provide:
//! - TOML analysis configuration with validation and content-addressed IDs
//! - Price series loading from CSV or a deterministic synthetic generator
//! - Single-analysis runner (fit, signal, zone events, simulation)
//! - Degree-sweep optimizer, sequential or rayon-parallel
//! - JSON and CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod optimizer;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError};
pub use data_loader::{
    load_from, load_series, CsvProvider, LoadError, LoadOptions, LoadedSeries, SyntheticProvider,
};
pub use export::save_artifacts;
pub use optimizer::{
    optimize, CandidateOutcome, DegreeResult, OptimizationResult, OptimizeError, OptimizerConfig,
};
pub use runner::{
    run_analysis, run_analysis_from_data, AnalysisReport, FitSummary, RunError, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<OptimizerConfig>();
        assert_sync::<OptimizerConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
        assert_send::<OptimizationResult>();
        assert_sync::<OptimizationResult>();
        assert_send::<DegreeResult>();
        assert_sync::<DegreeResult>();
        assert_send::<CandidateOutcome>();
        assert_sync::<CandidateOutcome>();
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
    }

    #[test]
    fn providers_are_send_sync() {
        assert_send::<CsvProvider>();
        assert_sync::<CsvProvider>();
        assert_send::<SyntheticProvider>();
        assert_sync::<SyntheticProvider>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<OptimizeError>();
        assert_sync::<OptimizeError>();
    }
}
