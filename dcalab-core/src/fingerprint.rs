//! Content fingerprints for price series and fit inputs.
//!
//! - `SeriesFingerprint`: BLAKE3 over every bar's date and OHLCV, in order.
//! - `FitKey`: (symbol, degree, variant, fingerprint); a memoization key for
//!   callers that cache fits. The core itself never caches.

use crate::domain::PriceSeries;
use crate::fit::FitVariant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic content hash of a price series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesFingerprint(pub String);

impl SeriesFingerprint {
    pub fn of(series: &PriceSeries) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(series.symbol().as_bytes());
        for bar in series.bars() {
            hasher.update(bar.date.to_string().as_bytes());
            for value in [bar.open, bar.high, bar.low, bar.close] {
                hasher.update(&value.to_le_bytes());
            }
            hasher.update(&bar.volume.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for logs and file names.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for SeriesFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one fit: equal keys always produce equal `FitResult`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FitKey {
    pub symbol: String,
    pub degree: usize,
    pub num_bands: usize,
    pub variant: FitVariant,
    pub series: SeriesFingerprint,
}

impl FitKey {
    pub fn new(series: &PriceSeries, degree: usize, num_bands: usize, variant: FitVariant) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            degree,
            num_bands,
            variant,
            series: SeriesFingerprint::of(series),
        }
    }

    /// Stable hash of the whole key, suitable as a cache file name.
    pub fn hash(&self) -> String {
        let canonical = serde_json::json!({
            "symbol": &self.symbol,
            "degree": self.degree,
            "num_bands": self.num_bands,
            "variant": self.variant.name(),
            "series": &self.series.0,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}
