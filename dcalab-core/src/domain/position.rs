use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a lot was funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyType {
    /// Regular daily allotment bought while price sits below the baseline.
    Daily,
    /// Multiplied allotment bought on a confirmed buy-zone signal.
    ZoneMultiplier,
}

/// One simulated purchase lot, open until a sell-all closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub buy_date: NaiveDate,
    pub buy_price: f64,
    pub buy_type: BuyType,
    /// Zone level of the entry; 0 for daily buys.
    pub buy_level: usize,
    pub shares: f64,
    pub amount_invested: f64,
    pub sell_date: Option<NaiveDate>,
    pub sell_price: Option<f64>,
    pub sell_level: Option<usize>,
    pub realized_pl: Option<f64>,
    /// Return as a fraction of the buy price.
    pub roi: Option<f64>,
    pub hold_days: Option<i64>,
}

impl Position {
    pub fn open(
        buy_date: NaiveDate,
        buy_price: f64,
        buy_type: BuyType,
        buy_level: usize,
        amount: f64,
    ) -> Self {
        Self {
            buy_date,
            buy_price,
            buy_type,
            buy_level,
            shares: amount / buy_price,
            amount_invested: amount,
            sell_date: None,
            sell_price: None,
            sell_level: None,
            realized_pl: None,
            roi: None,
            hold_days: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.sell_date.is_none()
    }

    /// Stamp the sell fields. No-op on an already closed lot.
    pub fn close(&mut self, date: NaiveDate, price: f64, level: usize) {
        if !self.is_open() {
            return;
        }
        self.sell_date = Some(date);
        self.sell_price = Some(price);
        self.sell_level = Some(level);
        self.realized_pl = Some((price - self.buy_price) * self.shares);
        self.roi = Some((price - self.buy_price) / self.buy_price);
        self.hold_days = Some((date - self.buy_date).num_days());
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    /// Mark-to-market profit of an open lot.
    pub fn unrealized_pl(&self, price: f64) -> f64 {
        self.market_value(price) - self.amount_invested
    }

    /// Days held so far (to `as_of` while open, to the sell date once closed).
    pub fn days_held(&self, as_of: NaiveDate) -> i64 {
        match self.hold_days {
            Some(days) => days,
            None => (as_of - self.buy_date).num_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn open_computes_shares() {
        let pos = Position::open(d(1), 50.0, BuyType::Daily, 0, 100.0);
        assert_eq!(pos.shares, 2.0);
        assert!(pos.is_open());
    }

    #[test]
    fn close_stamps_sell_fields() {
        let mut pos = Position::open(d(1), 50.0, BuyType::ZoneMultiplier, 2, 100.0);
        pos.close(d(11), 60.0, 1);
        assert_eq!(pos.sell_price, Some(60.0));
        assert_eq!(pos.sell_level, Some(1));
        assert_eq!(pos.realized_pl, Some(20.0));
        assert!((pos.roi.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(pos.hold_days, Some(10));
        assert!(!pos.is_open());
    }

    #[test]
    fn second_close_is_ignored() {
        let mut pos = Position::open(d(1), 50.0, BuyType::Daily, 0, 100.0);
        pos.close(d(5), 60.0, 1);
        pos.close(d(9), 10.0, 3);
        assert_eq!(pos.sell_date, Some(d(5)));
        assert_eq!(pos.sell_level, Some(1));
    }

    #[test]
    fn unrealized_pl_for_open_lot() {
        let pos = Position::open(d(1), 50.0, BuyType::Daily, 0, 100.0);
        assert_eq!(pos.unrealized_pl(40.0), -20.0);
        assert_eq!(pos.days_held(d(8)), 7);
    }
}
