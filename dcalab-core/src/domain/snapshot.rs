use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// End-of-day portfolio state recorded by the simulator.
///
/// `portfolio_value` is always `shares_held * close + realized_cash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub cumulative_invested: f64,
    pub portfolio_value: f64,
    pub shares_held: f64,
    pub realized_cash: f64,
}
