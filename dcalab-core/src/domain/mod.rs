//! Domain types for DcaLab

pub mod asset;
pub mod band;
pub mod bar;
pub mod position;
pub mod series;
pub mod snapshot;
pub mod trade;
pub mod zone;

pub use asset::AssetType;
pub use band::{ActiveZones, Band, BandStyle, BAND_MULTIPLIER, DEFAULT_NUM_BANDS};
pub use bar::PriceBar;
pub use position::{BuyType, Position};
pub use series::{
    horizon_rows, PriceSeries, SeriesError, MIN_OBSERVATIONS, TRADING_DAYS_PER_YEAR,
};
pub use snapshot::PortfolioSnapshot;
pub use trade::{TradeKind, TradeRecord};
pub use zone::{ZoneEvent, ZoneKind};

/// Symbol type alias
pub type Symbol = String;
