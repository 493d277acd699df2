//! Market summary: recent price changes and the 52-week range.

use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, SeriesError, MIN_OBSERVATIONS, TRADING_DAYS_PER_YEAR};

/// Lookback windows reported in the summary, in rows back from the last close.
pub const CHANGE_WINDOWS: [(ChangeWindow, usize); 5] = [
    (ChangeWindow::Daily, 1),
    (ChangeWindow::Weekly, 5),
    (ChangeWindow::Monthly, 21),
    (ChangeWindow::NinetyDay, 89),
    (ChangeWindow::SixMonth, 131),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeWindow {
    Daily,
    Weekly,
    Monthly,
    NinetyDay,
    SixMonth,
}

impl ChangeWindow {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeWindow::Daily => "1D",
            ChangeWindow::Weekly => "1W",
            ChangeWindow::Monthly => "1M",
            ChangeWindow::NinetyDay => "90D",
            ChangeWindow::SixMonth => "6M",
        }
    }
}

/// Change of the last close versus an earlier close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub window: ChangeWindow,
    pub rows_back: usize,
    pub absolute: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub symbol: String,
    pub last_close: f64,
    /// Only windows the series is long enough for are reported.
    pub changes: Vec<PriceChange>,
    pub week52_high: f64,
    pub week52_low: f64,
}

impl MarketSummary {
    pub fn change(&self, window: ChangeWindow) -> Option<&PriceChange> {
        self.changes.iter().find(|c| c.window == window)
    }
}

/// Summarize the tail of `series`. Requires at least 30 rows.
pub fn summarize(series: &PriceSeries) -> Result<MarketSummary, SeriesError> {
    series.require_len(MIN_OBSERVATIONS)?;
    let closes = series.closes();
    let last_close = closes[closes.len() - 1];

    let changes = CHANGE_WINDOWS
        .iter()
        .filter(|(_, back)| *back < closes.len())
        .map(|&(window, rows_back)| {
            let earlier = closes[closes.len() - 1 - rows_back];
            let absolute = last_close - earlier;
            PriceChange {
                window,
                rows_back,
                absolute,
                percent: if earlier != 0.0 {
                    absolute / earlier * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let year = series.tail(TRADING_DAYS_PER_YEAR);
    Ok(MarketSummary {
        symbol: series.symbol().to_string(),
        last_close,
        changes,
        week52_high: year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        week52_low: year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use chrono::NaiveDate;

    fn linear(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 1,
                }
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn short_series_is_refused() {
        assert!(matches!(
            summarize(&linear(29)),
            Err(SeriesError::InsufficientData { .. })
        ));
    }

    #[test]
    fn changes_use_rows_back() {
        let s = summarize(&linear(300)).unwrap();
        assert_eq!(s.changes.len(), 5);
        assert_eq!(s.change(ChangeWindow::Daily).unwrap().absolute, 1.0);
        assert_eq!(s.change(ChangeWindow::Weekly).unwrap().absolute, 5.0);
        assert_eq!(s.change(ChangeWindow::SixMonth).unwrap().absolute, 131.0);
        let monthly = s.change(ChangeWindow::Monthly).unwrap();
        assert!((monthly.percent - 21.0 / 378.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn long_windows_are_skipped_on_short_series() {
        let s = summarize(&linear(60)).unwrap();
        assert!(s.change(ChangeWindow::Monthly).is_some());
        assert!(s.change(ChangeWindow::NinetyDay).is_none());
    }

    #[test]
    fn week52_range_covers_last_year_only() {
        let s = summarize(&linear(300)).unwrap();
        assert_eq!(s.week52_high, 399.5);
        assert_eq!(s.week52_low, 100.0 + 48.0 - 0.5);
    }
}
