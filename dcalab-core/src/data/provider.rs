//! Price data provider trait and structured error types.
//!
//! The `PriceDataProvider` trait abstracts over data sources (CSV import,
//! synthetic series) so the engine never knows where bars came from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError, MIN_OBSERVATIONS};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    CsvImport,
    Synthetic,
}

/// Inclusive date window for a fetch. `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Supplier of validated, chronologically ordered price series.
pub trait PriceDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch daily bars for `symbol` within `range`.
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, DataError>;

    /// Fetch and refuse anything shorter than the 30-row analysis minimum.
    fn fetch_for_analysis(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, DataError> {
        let series = self.fetch(symbol, range)?;
        series.require_len(MIN_OBSERVATIONS)?;
        Ok(series)
    }
}
