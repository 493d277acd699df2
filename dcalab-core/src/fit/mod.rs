//! Baseline fitting: polynomial "fair value" curve plus residual bands.
//!
//! The independent variable is the row index `0..n`. Two normalizations are
//! supported (see [`FitVariant`]); both derive bands from the population
//! standard deviation of the residuals.
//!
//! Rank deficiency is not an error: the solve is minimum-norm least squares,
//! so the clamped degree is always kept. Only a failed solve (no SVD
//! convergence, non-finite output) halves the degree (minimum 1) and retries once.

pub mod polyfit;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Band, BandStyle, BAND_MULTIPLIER};
use polyfit::{polyfit, PolyfitError};

/// Normalization strategy applied before the least-squares solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitVariant {
    /// Index scaled to `[0, 1]`, prices fitted unscaled.
    Simple,
    /// Index and prices both centered on their mean and scaled by their std.
    #[default]
    Enhanced,
}

impl FitVariant {
    pub fn name(&self) -> &'static str {
        match self {
            FitVariant::Simple => "simple",
            FitVariant::Enhanced => "enhanced",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    #[error("insufficient data: {actual} closes, at least {required} required for fitting")]
    InsufficientData { required: usize, actual: usize },

    #[error("polynomial fit is ill-conditioned at degree {degree} even after reducing it")]
    IllConditioned { degree: usize },

    #[error("number of bands must be at least 1")]
    InvalidBandCount,

    #[error("close at row {index} is not finite")]
    NonFiniteInput { index: usize },
}

/// Fitted values aligned 1:1 with the input closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineCurve {
    pub values: Vec<f64>,
    pub requested_degree: usize,
    /// Degree actually used after clamping and any ill-conditioning fallback.
    pub effective_degree: usize,
    pub variant: FitVariant,
}

impl BaselineCurve {
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Baseline plus its deviation bands (tightest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub baseline: BaselineCurve,
    pub bands: Vec<Band>,
    /// Population standard deviation of `close - baseline`.
    pub std_residuals: f64,
}

impl FitResult {
    pub fn effective_degree(&self) -> usize {
        self.baseline.effective_degree
    }

    /// Copy restricted to the last `n` time steps, keeping baseline and bands aligned.
    pub fn tail(&self, n: usize) -> FitResult {
        let start = self.baseline.values.len().saturating_sub(n);
        FitResult {
            baseline: BaselineCurve {
                values: self.baseline.values[start..].to_vec(),
                ..self.baseline.clone()
            },
            bands: self.bands.iter().map(|b| b.tail(n)).collect(),
            std_residuals: self.std_residuals,
        }
    }
}

/// Fit a polynomial baseline of (at most) `degree` to `closes` and derive `num_bands` bands.
///
/// The degree is clamped to `closes.len() - 1`. Pure function: identical
/// inputs always produce identical outputs.
pub fn fit(
    closes: &[f64],
    degree: usize,
    num_bands: usize,
    variant: FitVariant,
) -> Result<FitResult, FitError> {
    if closes.len() < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            actual: closes.len(),
        });
    }
    if num_bands == 0 {
        return Err(FitError::InvalidBandCount);
    }
    if let Some(index) = closes.iter().position(|c| !c.is_finite()) {
        return Err(FitError::NonFiniteInput { index });
    }

    let clamped = degree.min(closes.len() - 1);
    let (values, effective_degree) = match fit_baseline(closes, clamped, variant) {
        Ok(values) => (values, clamped),
        Err(error) => {
            let reduced = (clamped / 2).max(1);
            debug!(
                degree = clamped,
                reduced,
                variant = variant.name(),
                %error,
                "ill-conditioned fit, retrying at reduced degree"
            );
            let values = fit_baseline(closes, reduced, variant)
                .map_err(|_| FitError::IllConditioned { degree: reduced })?;
            (values, reduced)
        }
    };

    let std_residuals = population_std_residuals(closes, &values);
    let bands = build_bands(&values, std_residuals, num_bands);

    Ok(FitResult {
        baseline: BaselineCurve {
            values,
            requested_degree: degree,
            effective_degree,
            variant,
        },
        bands,
        std_residuals,
    })
}

/// Bands `baseline ± level * BAND_MULTIPLIER * std_residuals` for levels `1..=num_bands`.
pub fn build_bands(baseline: &[f64], std_residuals: f64, num_bands: usize) -> Vec<Band> {
    (1..=num_bands)
        .map(|level| {
            let offset = level as f64 * BAND_MULTIPLIER * std_residuals;
            Band {
                level,
                lower: baseline.iter().map(|b| b - offset).collect(),
                upper: baseline.iter().map(|b| b + offset).collect(),
                style: BandStyle::for_level(level),
            }
        })
        .collect()
}

/// Fitted values in price units.
fn fit_baseline(
    closes: &[f64],
    degree: usize,
    variant: FitVariant,
) -> Result<Vec<f64>, PolyfitError> {
    let n = closes.len();
    let index: Vec<f64> = (0..n).map(|i| i as f64).collect();

    let values: Vec<f64> = match variant {
        FitVariant::Simple => {
            let max = (n - 1) as f64;
            let x: Vec<f64> = index.iter().map(|i| i / max).collect();
            let poly = solve_logged(&x, closes, degree, variant)?;
            x.iter().map(|&xi| poly.evaluate(xi)).collect()
        }
        FitVariant::Enhanced => {
            let (x_mean, x_std) = mean_std(&index);
            let (y_mean, y_std) = mean_std(closes);
            let x: Vec<f64> = index.iter().map(|i| (i - x_mean) / x_std).collect();
            let y: Vec<f64> = closes.iter().map(|c| (c - y_mean) / y_std).collect();
            let poly = solve_logged(&x, &y, degree, variant)?;
            x.iter()
                .map(|&xi| poly.evaluate(xi) * y_std + y_mean)
                .collect()
        }
    };

    if values.iter().any(|v| !v.is_finite()) {
        return Err(PolyfitError::NonFinite);
    }
    Ok(values)
}

fn solve_logged(
    x: &[f64],
    y: &[f64],
    degree: usize,
    variant: FitVariant,
) -> Result<polyfit::Polynomial, PolyfitError> {
    let poly = polyfit(x, y, degree)?;
    if !poly.is_full_rank() {
        debug!(
            degree,
            rank = poly.rank,
            variant = variant.name(),
            "rank-deficient design, using minimum-norm solution"
        );
    }
    Ok(poly)
}

/// Mean and population std; a zero std is replaced by 1.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    (mean, if std == 0.0 { 1.0 } else { std })
}

fn population_std_residuals(closes: &[f64], fitted: &[f64]) -> f64 {
    let residuals: Vec<f64> = closes.iter().zip(fitted).map(|(c, f)| c - f).collect();
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt()
}
