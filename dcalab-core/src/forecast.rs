//! Bitcoin cycle all-time-high projection.
//!
//! Each cycle's peak multiple shrinks; the projection applies a retention
//! factor to the last cycle's 3.5x multiple on the 69 000 peak.

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;

pub const LAST_CYCLE_ATH: f64 = 69_000.0;
pub const LAST_CYCLE_MULTIPLIER: f64 = 3.5;
/// Retention of the 2017 to 2021 cycle (3.5x / 17.9x).
pub const HISTORICAL_RETENTION: f64 = 0.20;

const BITCOIN_SYMBOLS: [&str; 3] = ["BTC-USD", "BTC", "BITCOIN"];

/// Known cycle peaks: (year, price, multiple over the previous peak).
pub const ATH_HISTORY: [(i32, f64, Option<f64>); 3] = [
    (2013, 1_100.0, None),
    (2017, 19_665.0, Some(17.9)),
    (2021, 69_000.0, Some(3.5)),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub retention: f64,
    pub multiplier: f64,
    pub price: f64,
}

impl Projection {
    fn at(retention: f64) -> Self {
        let multiplier = LAST_CYCLE_MULTIPLIER * retention;
        Self {
            retention,
            multiplier,
            price: LAST_CYCLE_ATH * multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthForecast {
    pub conservative: Projection,
    pub base: Projection,
    pub optimistic: Projection,
    /// Current price as a percent of the base projection.
    pub progress_pct: f64,
    /// Highest high in the supplied history.
    pub current_ath: f64,
    /// Days from the series high to the last bar; 0 unless the last cycle peak was exceeded.
    pub days_since_ath: i64,
}

pub fn is_bitcoin(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    BITCOIN_SYMBOLS.contains(&upper.as_str())
}

/// Projection for `symbol`, or `None` when it is not Bitcoin or `bars` is empty.
pub fn bitcoin_ath_forecast(symbol: &str, current_price: f64, bars: &[PriceBar]) -> Option<AthForecast> {
    if !is_bitcoin(symbol) {
        return None;
    }
    let last = bars.last()?;
    // First occurrence of the maximum high.
    let peak = bars
        .iter()
        .fold(None, |best: Option<&PriceBar>, bar| match best {
            Some(b) if b.high >= bar.high => Some(b),
            _ => Some(bar),
        })?;

    let base = Projection::at(0.65);
    let days_since_ath = if peak.high > LAST_CYCLE_ATH {
        (last.date - peak.date).num_days()
    } else {
        0
    };

    Some(AthForecast {
        conservative: Projection::at(0.55),
        base,
        optimistic: Projection::at(0.75),
        progress_pct: current_price / base.price * 100.0,
        current_ath: peak.high,
        days_since_ath,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(highs: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        highs
            .iter()
            .enumerate()
            .map(|(i, &h)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: h * 0.98,
                high: h,
                low: h * 0.95,
                close: h * 0.97,
                volume: 1,
            })
            .collect()
    }

    #[test]
    fn only_bitcoin_symbols() {
        assert!(is_bitcoin("btc-usd"));
        assert!(is_bitcoin("BITCOIN"));
        assert!(!is_bitcoin("ETH-USD"));
        assert!(bitcoin_ath_forecast("AAPL", 100.0, &bars(&[100.0])).is_none());
    }

    #[test]
    fn projections_scale_last_cycle() {
        let f = bitcoin_ath_forecast("BTC-USD", 78_487.5, &bars(&[60_000.0])).unwrap();
        assert!((f.conservative.price - 132_825.0).abs() < 1e-6);
        assert!((f.base.price - 156_975.0).abs() < 1e-6);
        assert!((f.optimistic.price - 181_125.0).abs() < 1e-6);
        assert!((f.progress_pct - 50.0).abs() < 1e-9);
        assert_eq!(f.days_since_ath, 0);
    }

    #[test]
    fn days_since_new_cycle_high() {
        let f = bitcoin_ath_forecast("BTC", 90_000.0, &bars(&[70_000.0, 100_000.0, 95_000.0, 90_000.0]))
            .unwrap();
        assert_eq!(f.current_ath, 100_000.0);
        assert_eq!(f.days_since_ath, 2);
    }
}
