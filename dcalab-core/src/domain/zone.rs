//! ZoneEvent: a confirmed touch-and-hold crossing of a band.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a zone crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Lower band touched, then held above.
    Buy,
    /// Upper band touched, then held below.
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEvent {
    /// Confirmation day (the "hold" day).
    pub date: NaiveDate,
    /// Close on the confirmation day.
    pub price: f64,
    /// 1-based band level.
    pub zone_level: usize,
    /// Band value on the confirmation day.
    pub zone_price: f64,
    pub kind: ZoneKind,
}
