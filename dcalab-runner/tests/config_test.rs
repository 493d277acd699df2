//! Loading analysis configs from disk.

use dcalab_core::domain::AssetType;
use dcalab_core::engine::DcaStrategy;
use dcalab_runner::{AnalysisConfig, ConfigError};

fn write(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("analysis.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_partial_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        r#"
[analysis]
symbol = "BTC-USD"
degree = 4
active_zones = [2, 3]

[simulation]
budget = 25000.0
horizon_years = 2.0
strategy = "simplified"
"#,
    );

    let config = AnalysisConfig::from_file(&path).unwrap();
    assert_eq!(config.analysis.symbol, "BTC-USD");
    assert_eq!(config.analysis.degree, 4);
    assert_eq!(config.analysis.num_bands, 4);
    assert_eq!(config.asset_type(), AssetType::Crypto);

    let sim = config.simulation_config();
    assert_eq!(sim.total_budget, 25_000.0);
    assert_eq!(sim.strategy, DcaStrategy::Simplified);
    assert!(sim.active_zones.contains(2));
    assert!(!sim.active_zones.contains(1));
    assert_eq!(config.optimizer.max_degree, 20);
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "[simulation]\nbudget = 50.0\n");
    let err = AnalysisConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "simulation.budget", .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AnalysisConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn config_id_tracks_content() {
    let a = AnalysisConfig::for_symbol("SPY");
    let mut b = a.clone();
    assert_eq!(a.config_id().unwrap(), b.config_id().unwrap());
    b.analysis.degree = 3;
    assert_ne!(a.config_id().unwrap(), b.config_id().unwrap());
}
