//! Deviation bands around the fitted baseline.
//!
//! Band `i` (1-based) spans `baseline ± i * BAND_MULTIPLIER * σ_residual`.
//! The lower edge is a DCA buy level, the upper edge a take-profit level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Residual standard deviations between consecutive bands.
pub const BAND_MULTIPLIER: f64 = 1.5;

/// Default number of bands drawn around the baseline.
pub const DEFAULT_NUM_BANDS: usize = 4;

/// Display styling attached to a band level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandStyle {
    pub color: String,
    pub take_profit_label: String,
    pub take_profit_color: String,
    pub buy_label: String,
    pub buy_color: String,
}

impl BandStyle {
    /// Preset styling for a 1-based band level. Levels past the presets get a neutral style.
    pub fn for_level(level: usize) -> Self {
        let (color, tp_color) = match level {
            1 => ("green", "black"),
            2 => ("blue", "blue"),
            3 => ("red", "red"),
            4 => ("purple", "purple"),
            _ => ("gray", "gray"),
        };
        let buy_color = if level == 1 { "green" } else { color };
        Self {
            color: color.to_string(),
            take_profit_label: format!("Take Profit Level {level}"),
            take_profit_color: tp_color.to_string(),
            buy_label: format!("DCA Buy Level {level}"),
            buy_color: buy_color.to_string(),
        }
    }
}

/// One symmetric deviation band, aligned 1:1 with the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// 1-based level; 1 is the tightest band.
    pub level: usize,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub style: BandStyle,
}

impl Band {
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Lower (buy) level at the final time step.
    pub fn last_lower(&self) -> Option<f64> {
        self.lower.last().copied()
    }

    /// Upper (take-profit) level at the final time step.
    pub fn last_upper(&self) -> Option<f64> {
        self.upper.last().copied()
    }

    /// Copy of this band restricted to its last `n` values.
    pub fn tail(&self, n: usize) -> Band {
        let start = self.lower.len().saturating_sub(n);
        Band {
            level: self.level,
            lower: self.lower[start..].to_vec(),
            upper: self.upper[start..].to_vec(),
            style: self.style.clone(),
        }
    }
}

/// Set of take-profit levels allowed to generate sell decisions.
///
/// Deactivating a level does not remove its band; it only stops that level
/// from being treated as a sell zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveZones(BTreeSet<usize>);

impl ActiveZones {
    /// Every level from 1 to `num_bands` active.
    pub fn all(num_bands: usize) -> Self {
        Self((1..=num_bands).collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_levels(levels: impl IntoIterator<Item = usize>) -> Self {
        Self(levels.into_iter().collect())
    }

    pub fn contains(&self, level: usize) -> bool {
        self.0.contains(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest active level strictly above `level`.
    pub fn next_above(&self, level: usize) -> Option<usize> {
        self.0.range(level + 1..).next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ActiveZones {
    fn default() -> Self {
        Self::all(DEFAULT_NUM_BANDS)
    }
}
