//! TradeRecord: one entry in the chronological trade ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    DailyBuy,
    ZoneBuy,
    SellAll,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TradeKind::DailyBuy => "BUY Daily",
            TradeKind::ZoneBuy => "BUY 5X",
            TradeKind::SellAll => "SELL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub kind: TradeKind,
    /// Zone level (0 for daily buys).
    pub level: usize,
    pub price: f64,
    pub shares: f64,
    pub amount: f64,
}
