//! Simulation configuration, mutable ledger state, and run result types.

use crate::domain::{
    ActiveZones, AssetType, BuyType, PortfolioSnapshot, Position, PriceBar, TradeKind,
    TradeRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the daily allotment on a confirmed zone buy.
pub const ZONE_BUY_MULTIPLIER: f64 = 5.0;

/// Simulated-day spacing of dividend payments.
pub const DIVIDEND_INTERVAL_DAYS: usize = 90;

/// How buy days are funded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DcaStrategy {
    /// Plain daily DCA below the baseline; zone signals are ignored.
    Simplified,
    /// Daily DCA plus a 5X buy on every confirmed buy-zone crossing.
    #[default]
    ZoneMultiplier,
}

/// Cash dividend paid per share, reinvested on payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPolicy {
    /// Dollars per share per year.
    pub annual_rate: f64,
}

impl DividendPolicy {
    pub fn quarterly_per_share(&self) -> f64 {
        self.annual_rate / 4.0
    }
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub total_budget: f64,
    /// Informational; callers truncate the series to the horizon before simulating.
    pub horizon_years: f64,
    pub strategy: DcaStrategy,
    pub asset_type: AssetType,
    pub dividend: Option<DividendPolicy>,
    /// Take-profit levels allowed to trigger a sell-all.
    pub active_zones: ActiveZones,
}

impl SimulationConfig {
    pub fn new(total_budget: f64, horizon_years: f64) -> Self {
        Self {
            total_budget,
            horizon_years,
            strategy: DcaStrategy::default(),
            asset_type: AssetType::Stock,
            dividend: None,
            active_zones: ActiveZones::default(),
        }
    }

    /// Dividends apply only to dividend-paying stocks with a positive rate.
    pub fn pays_dividends(&self) -> bool {
        self.asset_type.pays_dividends()
            && self.dividend.is_some_and(|d| d.annual_rate > 0.0)
    }
}

/// Lowest take-profit level still above the last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextTarget {
    pub level: usize,
    pub price: f64,
}

/// Mutable state that evolves day-by-day during the simulation loop.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub total_invested: f64,
    pub shares: f64,
    pub realized_cash: f64,
    pub dividend_income: f64,
    pub dividend_shares: f64,
    pub daily_buy_count: usize,
    pub zone_buy_count: usize,
    pub sell_count: usize,
    pub positions: Vec<Position>,
    pub trades: Vec<TradeRecord>,
    pub snapshots: Vec<PortfolioSnapshot>,
}

impl Ledger {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(days),
            ..Self::default()
        }
    }

    /// Invest `amount` at `price` and open a lot.
    pub fn buy(&mut self, date: NaiveDate, price: f64, buy_type: BuyType, level: usize, amount: f64) {
        let position = Position::open(date, price, buy_type, level, amount);
        let kind = match buy_type {
            BuyType::Daily => {
                self.daily_buy_count += 1;
                TradeKind::DailyBuy
            }
            BuyType::ZoneMultiplier => {
                self.zone_buy_count += 1;
                TradeKind::ZoneBuy
            }
        };
        self.total_invested += amount;
        self.shares += position.shares;
        self.trades.push(TradeRecord {
            date,
            kind,
            level,
            price,
            shares: position.shares,
            amount,
        });
        self.positions.push(position);
    }

    /// Liquidate the whole share balance at `price` and close every open lot.
    pub fn sell_all(&mut self, date: NaiveDate, price: f64, level: usize) {
        let shares = self.shares;
        let proceeds = shares * price;
        self.realized_cash += proceeds;
        self.sell_count += 1;
        for position in self.positions.iter_mut().filter(|p| p.is_open()) {
            position.close(date, price, level);
        }
        self.trades.push(TradeRecord {
            date,
            kind: TradeKind::SellAll,
            level,
            price,
            shares,
            amount: proceeds,
        });
        self.shares = 0.0;
    }

    /// Pay a dividend on the current balance and reinvest it at `price`.
    pub fn reinvest_dividend(&mut self, per_share: f64, price: f64) {
        let payment = per_share * self.shares;
        let bought = payment / price;
        self.dividend_income += payment;
        self.dividend_shares += bought;
        self.shares += bought;
    }

    pub fn snapshot(&mut self, bar: &PriceBar) {
        self.snapshots.push(PortfolioSnapshot {
            date: bar.date,
            close: bar.close,
            cumulative_invested: self.total_invested,
            portfolio_value: self.shares * bar.close + self.realized_cash,
            shares_held: self.shares,
            realized_cash: self.realized_cash,
        });
    }
}

/// Aggregate of a complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_invested: f64,
    /// Shares held at the end, dividend-funded shares included.
    pub shares_held: f64,
    pub realized_cash: f64,
    pub current_value: f64,
    pub dividend_income: f64,
    pub dividend_shares: f64,
    pub dividend_shares_value: f64,
    pub total_return: f64,
    /// Percent; 0 when nothing was invested.
    pub roi_percentage: f64,
    pub next_tp: Option<NextTarget>,
    pub daily_buy_count: usize,
    pub zone_buy_count: usize,
    pub sell_count: usize,
    pub daily_dca_amount: f64,
    pub trading_days: usize,
    pub horizon_years: f64,
    pub positions: Vec<Position>,
    pub trades: Vec<TradeRecord>,
    pub snapshots: Vec<PortfolioSnapshot>,
}

impl SimulationResult {
    /// All-zero result for an empty series.
    pub fn empty(horizon_years: f64) -> Self {
        Self {
            total_invested: 0.0,
            shares_held: 0.0,
            realized_cash: 0.0,
            current_value: 0.0,
            dividend_income: 0.0,
            dividend_shares: 0.0,
            dividend_shares_value: 0.0,
            total_return: 0.0,
            roi_percentage: 0.0,
            next_tp: None,
            daily_buy_count: 0,
            zone_buy_count: 0,
            sell_count: 0,
            daily_dca_amount: 0.0,
            trading_days: 0,
            horizon_years,
            positions: Vec::new(),
            trades: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_open())
    }

    pub fn closed_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| !p.is_open())
    }

    /// Mark-to-market profit of lots still open at `last_close`.
    pub fn unrealized_pl(&self, last_close: f64) -> f64 {
        self.open_positions().map(|p| p.unrealized_pl(last_close)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = SimulationConfig::new(10_000.0, 1.0);
        assert_eq!(config.strategy, DcaStrategy::ZoneMultiplier);
        assert_eq!(config.active_zones, ActiveZones::all(4));
        assert!(!config.pays_dividends());
    }

    #[test]
    fn crypto_never_pays_dividends() {
        let mut config = SimulationConfig::new(10_000.0, 1.0);
        config.dividend = Some(DividendPolicy { annual_rate: 2.0 });
        assert!(config.pays_dividends());
        config.asset_type = AssetType::Crypto;
        assert!(!config.pays_dividends());
    }

    #[test]
    fn ledger_buy_then_sell_all() {
        let mut ledger = Ledger::default();
        ledger.buy(d(1), 10.0, BuyType::Daily, 0, 100.0);
        ledger.buy(d(2), 20.0, BuyType::ZoneMultiplier, 1, 100.0);
        assert_eq!(ledger.shares, 15.0);
        assert_eq!(ledger.daily_buy_count, 1);
        assert_eq!(ledger.zone_buy_count, 1);

        ledger.sell_all(d(3), 30.0, 2);
        assert_eq!(ledger.shares, 0.0);
        assert_eq!(ledger.realized_cash, 450.0);
        assert!(ledger.positions.iter().all(|p| p.sell_level == Some(2)));
        assert_eq!(ledger.trades.last().map(|t| t.kind), Some(TradeKind::SellAll));
    }

    #[test]
    fn dividend_reinvestment_tracks_shares_separately() {
        let mut ledger = Ledger::default();
        ledger.buy(d(1), 10.0, BuyType::Daily, 0, 100.0);
        ledger.reinvest_dividend(0.5, 10.0);
        assert_eq!(ledger.dividend_income, 5.0);
        assert_eq!(ledger.dividend_shares, 0.5);
        assert_eq!(ledger.shares, 10.5);
        assert_eq!(ledger.total_invested, 100.0);
    }
}
