//! Price data sources.

pub mod provider;

pub use provider::{DataError, DataSource, DateRange, PriceDataProvider};
