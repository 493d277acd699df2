//! Intensity optimizer: sweep the polynomial degree, keep the best ROI.
//!
//! Each candidate degree is refit from scratch and simulated on the last
//! `252 × horizon_years` rows. Candidates are independent, so the sweep can
//! run on rayon workers; results are always collected in degree order and the
//! winner is picked with a strict `>`, so ties go to the lowest degree either way.

use dcalab_core::domain::{horizon_rows, PriceSeries};
use dcalab_core::engine::{simulate, SimulationConfig, SimulationError};
use dcalab_core::fit::{fit, FitError, FitVariant};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("degree range is empty: min {min} > max {max}")]
    EmptyRange { min: usize, max: usize },

    #[error("degrees start at 1, got min {0}")]
    ZeroDegree(usize),

    #[error("step must be at least 1")]
    ZeroStep,
}

/// Degree sweep parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub min_degree: usize,
    pub max_degree: usize,
    pub step: usize,
    pub num_bands: usize,
    pub variant: FitVariant,
    /// Evaluate candidates on the rayon pool.
    pub parallel: bool,
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.min_degree == 0 {
            return Err(OptimizeError::ZeroDegree(self.min_degree));
        }
        if self.step == 0 {
            return Err(OptimizeError::ZeroStep);
        }
        if self.min_degree > self.max_degree {
            return Err(OptimizeError::EmptyRange {
                min: self.min_degree,
                max: self.max_degree,
            });
        }
        Ok(())
    }

    /// `min, min + step, ...` up to and including `max`.
    pub fn degrees(&self) -> Vec<usize> {
        (self.min_degree..=self.max_degree)
            .step_by(self.step.max(1))
            .collect()
    }
}

/// Totals recorded for one successful candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeResult {
    pub degree: usize,
    pub effective_degree: usize,
    pub roi_percentage: f64,
    pub total_return: f64,
    pub total_invested: f64,
    pub daily_buy_count: usize,
    pub zone_buy_count: usize,
    pub sell_count: usize,
}

/// Why a candidate was excluded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateError {
    #[error("fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}

/// Outcome of evaluating one degree.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Success(DegreeResult),
    Failed { degree: usize, error: CandidateError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub degree: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Range minimum when every candidate failed.
    pub optimal_degree: usize,
    /// `f64::NEG_INFINITY` when every candidate failed; `null` in JSON.
    #[serde(with = "sentinel_as_null")]
    pub best_roi: f64,
    /// Successful candidates, in degree order.
    pub all_results: Vec<DegreeResult>,
    pub skipped: Vec<SkippedCandidate>,
}

impl OptimizationResult {
    /// True when no candidate produced a result.
    pub fn is_exhausted(&self) -> bool {
        self.all_results.is_empty() || self.best_roi == f64::NEG_INFINITY
    }

    pub fn best(&self) -> Option<&DegreeResult> {
        if self.is_exhausted() {
            return None;
        }
        self.all_results.iter().find(|r| r.degree == self.optimal_degree)
    }
}

/// JSON has no infinities; the exhausted sentinel round-trips as `null`.
mod sentinel_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

/// Evaluate one degree: fit the full series, truncate to the horizon, simulate.
pub fn evaluate_degree(
    series: &PriceSeries,
    degree: usize,
    num_bands: usize,
    variant: FitVariant,
    sim: &SimulationConfig,
) -> CandidateOutcome {
    match run_candidate(series, degree, num_bands, variant, sim) {
        Ok(result) => CandidateOutcome::Success(result),
        Err(error) => CandidateOutcome::Failed { degree, error },
    }
}

fn run_candidate(
    series: &PriceSeries,
    degree: usize,
    num_bands: usize,
    variant: FitVariant,
    sim: &SimulationConfig,
) -> Result<DegreeResult, CandidateError> {
    let fitted = fit(&series.closes(), degree, num_bands, variant)?;
    let rows = horizon_rows(sim.horizon_years).min(series.len());
    let window = fitted.tail(rows);
    let result = simulate(
        series.tail(rows),
        &window.baseline.values,
        &window.bands,
        sim,
    )?;
    Ok(DegreeResult {
        degree,
        effective_degree: fitted.effective_degree(),
        roi_percentage: result.roi_percentage,
        total_return: result.total_return,
        total_invested: result.total_invested,
        daily_buy_count: result.daily_buy_count,
        zone_buy_count: result.zone_buy_count,
        sell_count: result.sell_count,
    })
}

/// Sweep the configured degrees and select the strictly best ROI.
pub fn optimize(
    series: &PriceSeries,
    sim: &SimulationConfig,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, OptimizeError> {
    config.validate()?;
    let degrees = config.degrees();
    info!(
        symbol = series.symbol(),
        candidates = degrees.len(),
        parallel = config.parallel,
        "optimizing intensity"
    );

    let evaluate = |&degree: &usize| {
        evaluate_degree(series, degree, config.num_bands, config.variant, sim)
    };
    let outcomes: Vec<CandidateOutcome> = if config.parallel {
        degrees.par_iter().map(evaluate).collect()
    } else {
        degrees.iter().map(evaluate).collect()
    };

    let result = select_best(config.min_degree, outcomes);
    if result.is_exhausted() {
        warn!(symbol = series.symbol(), "no viable intensity found");
    } else {
        info!(
            optimal_degree = result.optimal_degree,
            best_roi = result.best_roi,
            "optimization complete"
        );
    }
    Ok(result)
}

/// Fold outcomes (in degree order) into the result. Ties keep the earlier degree.
pub fn select_best(min_degree: usize, outcomes: Vec<CandidateOutcome>) -> OptimizationResult {
    let mut result = OptimizationResult {
        optimal_degree: min_degree,
        best_roi: f64::NEG_INFINITY,
        all_results: Vec::new(),
        skipped: Vec::new(),
    };

    for outcome in outcomes {
        match outcome {
            CandidateOutcome::Success(candidate) => {
                debug!(
                    degree = candidate.degree,
                    roi = candidate.roi_percentage,
                    "candidate evaluated"
                );
                if candidate.roi_percentage > result.best_roi {
                    result.best_roi = candidate.roi_percentage;
                    result.optimal_degree = candidate.degree;
                }
                result.all_results.push(candidate);
            }
            CandidateOutcome::Failed { degree, error } => {
                warn!(degree, %error, "skipping candidate");
                result.skipped.push(SkippedCandidate {
                    degree,
                    reason: error.to_string(),
                });
            }
        }
    }
    result
}
