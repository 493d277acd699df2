//! Serializable analysis configuration.
//!
//! Loaded from TOML with three sections (`[analysis]`, `[simulation]`,
//! `[optimizer]`); every field has a default so partial files are valid.
//! Validation happens once at load, so downstream code can trust the values.

use std::path::Path;

use dcalab_core::domain::{ActiveZones, AssetType, DEFAULT_NUM_BANDS};
use dcalab_core::engine::{DcaStrategy, DividendPolicy, SimulationConfig};
use dcalab_core::fit::FitVariant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimizer::OptimizerConfig;

/// Upper bound of the intensity slider.
pub const MAX_DEGREE: usize = 100;
/// Presets exist for four bands.
pub const MAX_BANDS: usize = 4;
pub const MIN_BUDGET: f64 = 100.0;
pub const MIN_HORIZON_YEARS: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// What to fit and classify.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSection {
    pub symbol: String,
    pub degree: usize,
    pub variant: FitVariant,
    pub num_bands: usize,
    /// Take-profit levels allowed to signal a sell.
    pub active_zones: Vec<usize>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            degree: 2,
            variant: FitVariant::Enhanced,
            num_bands: DEFAULT_NUM_BANDS,
            active_zones: (1..=DEFAULT_NUM_BANDS).collect(),
        }
    }
}

/// Backtest parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSection {
    pub budget: f64,
    pub horizon_years: f64,
    pub strategy: DcaStrategy,
    /// `None` detects the asset type from the symbol.
    pub asset_type: Option<AssetType>,
    /// Dollars per share per year; 0 disables dividends.
    pub annual_dividend_rate: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            budget: 10_000.0,
            horizon_years: 1.0,
            strategy: DcaStrategy::ZoneMultiplier,
            asset_type: None,
            annual_dividend_rate: 0.0,
        }
    }
}

/// Degree sweep bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerSection {
    pub min_degree: usize,
    pub max_degree: usize,
    pub step: usize,
    pub parallel: bool,
}

impl Default for OptimizerSection {
    fn default() -> Self {
        Self {
            min_degree: 1,
            max_degree: 20,
            step: 2,
            parallel: true,
        }
    }
}

/// Complete, validated configuration for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub analysis: AnalysisSection,
    pub simulation: SimulationSection,
    pub optimizer: OptimizerSection,
}

impl AnalysisConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration for `symbol`.
    pub fn for_symbol(symbol: &str) -> Self {
        let mut config = Self::default();
        config.analysis.symbol = symbol.to_string();
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.symbol.trim().is_empty() {
            return Err(invalid("analysis.symbol", "must not be empty"));
        }
        if !(1..=MAX_DEGREE).contains(&a.degree) {
            return Err(invalid(
                "analysis.degree",
                format!("{} is outside 1..={MAX_DEGREE}", a.degree),
            ));
        }
        if !(1..=MAX_BANDS).contains(&a.num_bands) {
            return Err(invalid(
                "analysis.num_bands",
                format!("{} is outside 1..={MAX_BANDS}", a.num_bands),
            ));
        }
        if let Some(&level) = a
            .active_zones
            .iter()
            .find(|&&level| level == 0 || level > a.num_bands)
        {
            return Err(invalid(
                "analysis.active_zones",
                format!("level {level} is outside 1..={}", a.num_bands),
            ));
        }

        let s = &self.simulation;
        if !s.budget.is_finite() || s.budget < MIN_BUDGET {
            return Err(invalid(
                "simulation.budget",
                format!("{} is below the {MIN_BUDGET} minimum", s.budget),
            ));
        }
        if !s.horizon_years.is_finite() || s.horizon_years < MIN_HORIZON_YEARS {
            return Err(invalid(
                "simulation.horizon_years",
                format!("{} is below the {MIN_HORIZON_YEARS} year minimum", s.horizon_years),
            ));
        }
        if !s.annual_dividend_rate.is_finite() || s.annual_dividend_rate < 0.0 {
            return Err(invalid(
                "simulation.annual_dividend_rate",
                "must be a non-negative amount",
            ));
        }

        self.optimizer_config().validate().map_err(|e| invalid("optimizer", e.to_string()))
    }

    /// Content-addressed identity: BLAKE3 of the canonical JSON.
    pub fn config_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn asset_type(&self) -> AssetType {
        self.simulation
            .asset_type
            .unwrap_or_else(|| AssetType::detect(&self.analysis.symbol))
    }

    pub fn active_zones(&self) -> ActiveZones {
        ActiveZones::from_levels(self.analysis.active_zones.iter().copied())
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        let s = &self.simulation;
        SimulationConfig {
            total_budget: s.budget,
            horizon_years: s.horizon_years,
            strategy: s.strategy,
            asset_type: self.asset_type(),
            dividend: (s.annual_dividend_rate > 0.0).then_some(DividendPolicy {
                annual_rate: s.annual_dividend_rate,
            }),
            active_zones: self.active_zones(),
        }
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        let o = &self.optimizer;
        OptimizerConfig {
            min_degree: o.min_degree,
            max_degree: o.max_degree,
            step: o.step,
            num_bands: self.analysis.num_bands,
            variant: self.analysis.variant,
            parallel: o.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[analysis]
symbol = "MSFT"
degree = 5
variant = "simple"
num_bands = 3
active_zones = [2, 3]

[simulation]
budget = 25000.0
horizon_years = 2.0
strategy = "simplified"
asset_type = "stock"
annual_dividend_rate = 3.0

[optimizer]
min_degree = 2
max_degree = 10
step = 4
parallel = false
"#;

    #[test]
    fn parses_full_file() {
        let config = AnalysisConfig::from_toml(FULL).unwrap();
        assert_eq!(config.analysis.symbol, "MSFT");
        assert_eq!(config.analysis.variant, FitVariant::Simple);
        assert_eq!(config.simulation.strategy, DcaStrategy::Simplified);
        assert_eq!(config.optimizer.step, 4);

        let sim = config.simulation_config();
        assert_eq!(sim.total_budget, 25_000.0);
        assert_eq!(sim.dividend, Some(DividendPolicy { annual_rate: 3.0 }));
        assert!(sim.active_zones.contains(2));
        assert!(!sim.active_zones.contains(1));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.analysis.degree, 2);
        assert_eq!(config.simulation.budget, 10_000.0);
        assert!(config.simulation_config().dividend.is_none());
    }

    #[test]
    fn asset_type_detected_when_omitted() {
        let config = AnalysisConfig::for_symbol("BTC-USD");
        assert_eq!(config.asset_type(), AssetType::Crypto);
        assert_eq!(AnalysisConfig::for_symbol("SPY").asset_type(), AssetType::Stock);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            ("[analysis]\ndegree = 0", "analysis.degree"),
            ("[analysis]\ndegree = 101", "analysis.degree"),
            ("[analysis]\nnum_bands = 5", "analysis.num_bands"),
            ("[analysis]\nnum_bands = 2\nactive_zones = [3]", "analysis.active_zones"),
            ("[simulation]\nbudget = 99.0", "simulation.budget"),
            ("[simulation]\nhorizon_years = 0.5", "simulation.horizon_years"),
            ("[optimizer]\nmin_degree = 9\nmax_degree = 3", "optimizer"),
            ("[optimizer]\nstep = 0", "optimizer"),
        ];
        for (toml, field) in cases {
            match AnalysisConfig::from_toml(toml) {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field, "{toml}"),
                other => panic!("expected invalid {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            AnalysisConfig::from_toml("[analysis\nsymbol = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_id_is_deterministic() {
        let a = AnalysisConfig::from_toml(FULL).unwrap();
        let b = AnalysisConfig::from_toml(FULL).unwrap();
        assert_eq!(a.config_id().unwrap(), b.config_id().unwrap());

        let mut c = a.clone();
        c.analysis.degree = 6;
        assert_ne!(a.config_id().unwrap(), c.config_id().unwrap());
    }
}
