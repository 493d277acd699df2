//! Zone crossing detection: two-day touch-then-hold confirmation.
//!
//! Buy: yesterday's range straddled (or touched from below) the lower band,
//! today's whole range sits strictly above it.
//! Sell: yesterday's range straddled the upper band, today's whole range sits
//! strictly below it.
//!
//! Every matching (day, level) pair is emitted; levels are not deduplicated.

use crate::domain::{Band, PriceBar, ZoneEvent, ZoneKind};

/// Confirmed buy-zone events, in chronological order (levels ascending within a day).
pub fn detect_buy_signals(bars: &[PriceBar], bands: &[Band]) -> Vec<ZoneEvent> {
    detect(bars, bands, ZoneKind::Buy)
}

/// Confirmed take-profit events, in chronological order (levels ascending within a day).
pub fn detect_sell_signals(bars: &[PriceBar], bands: &[Band]) -> Vec<ZoneEvent> {
    detect(bars, bands, ZoneKind::Sell)
}

fn detect(bars: &[PriceBar], bands: &[Band], kind: ZoneKind) -> Vec<ZoneEvent> {
    let n = aligned_len(bars, bands);
    let mut events = Vec::new();

    for i in 1..n {
        let today = &bars[i];
        let yesterday = &bars[i - 1];

        for band in bands {
            let (zone, zone_yesterday) = match kind {
                ZoneKind::Buy => (band.lower[i], band.lower[i - 1]),
                ZoneKind::Sell => (band.upper[i], band.upper[i - 1]),
            };

            let confirmed = match kind {
                ZoneKind::Buy => {
                    let touched = yesterday.high > zone_yesterday && yesterday.low <= zone_yesterday;
                    let held_above = today.low > zone && today.high > zone;
                    touched && held_above
                }
                ZoneKind::Sell => {
                    let touched = yesterday.low < zone_yesterday && yesterday.high >= zone_yesterday;
                    let held_below = today.high < zone && today.low < zone;
                    touched && held_below
                }
            };

            if confirmed {
                events.push(ZoneEvent {
                    date: today.date,
                    price: today.close,
                    zone_level: band.level,
                    zone_price: zone,
                    kind,
                });
            }
        }
    }

    events
}

/// Number of time steps covered by both the bars and every band.
fn aligned_len(bars: &[PriceBar], bands: &[Band]) -> usize {
    bands
        .iter()
        .map(|b| b.lower.len().min(b.upper.len()))
        .fold(bars.len(), usize::min)
}
