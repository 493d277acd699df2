//! PriceSeries: chronologically ordered daily bars for one symbol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::PriceBar;

/// Minimum number of observations for any downstream calculation to be meaningful.
pub const MIN_OBSERVATIONS: usize = 30;

/// Trading days per year, used for horizon truncation and 52-week lookbacks.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Errors raised when constructing or validating a price series.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    #[error("insufficient data: {actual} observations, at least {required} required")]
    InsufficientData { required: usize, actual: usize },

    #[error("dates must be strictly increasing (row {index}: {date})")]
    NonMonotonicDates { index: usize, date: chrono::NaiveDate },

    #[error("invalid OHLC values at row {index} ({date})")]
    InvalidBar { index: usize, date: chrono::NaiveDate },
}

/// Immutable, validated series of daily bars.
///
/// Invariants established by [`PriceSeries::new`]: dates strictly increase and
/// every bar satisfies `low <= open, close <= high` with positive prices.
/// An empty series is valid; length requirements are checked by callers via
/// [`PriceSeries::require_len`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InvalidBar {
                    index,
                    date: bar.date,
                });
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(SeriesError::NonMonotonicDates {
                    index,
                    date: bar.date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Fails with `InsufficientData` unless the series holds at least `required` rows.
    pub fn require_len(&self, required: usize) -> Result<(), SeriesError> {
        if self.bars.len() < required {
            return Err(SeriesError::InsufficientData {
                required,
                actual: self.bars.len(),
            });
        }
        Ok(())
    }

    /// The last `n` rows (or the whole series when it is shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}

/// Number of trailing rows covered by an investment horizon of `years`.
pub fn horizon_rows(years: f64) -> usize {
    if !years.is_finite() || years <= 0.0 {
        return 0;
    }
    (TRADING_DAYS_PER_YEAR as f64 * years) as usize
}
