//! Signal classification: where the latest price sits relative to the bands.
//!
//! Zone scan runs tightest band first and stops at the first hit:
//! a band whose lower edge is above the price marks a buy zone; a band whose
//! upper edge is below the price marks a sell zone, but only when that level
//! is active. Deactivating a level therefore changes which band is "current".
//!
//! Decision table (first match wins):
//! 1. sell zone and above baseline → SELL
//! 2. buy zone and below baseline  → BUY
//! 3. above baseline, no zone      → WAIT (hold)
//! 4. below baseline, no zone      → WAIT (monitor)
//! 5. otherwise                    → NEUTRAL

mod narrative;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ActiveZones, Band, PriceBar, ZoneKind, TRADING_DAYS_PER_YEAR};

/// Momentum window, in rows including today.
pub const MOMENTUM_WINDOW: usize = 5;
/// Absolute 5-day move (percent) that counts as pushing or rejecting.
pub const MOMENTUM_THRESHOLD_PCT: f64 = 2.0;
/// Rows in the "recent" high/low window.
pub const RECENT_WINDOW: usize = 30;
/// `price / high` above this counts as near the historical high.
pub const NEAR_HIGH_RATIO: f64 = 0.95;
/// `price / low` below this counts as near the historical low.
pub const NEAR_LOW_RATIO: f64 = 1.05;
/// Relative distance from the baseline treated as "on" the baseline.
pub const BASELINE_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("price history is empty")]
    EmptyHistory,

    #[error("no bands to classify against")]
    NoBands,

    #[error("current price must be a positive finite number, got {0}")]
    InvalidPrice(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Sell,
    Buy,
    WaitHold,
    WaitMonitor,
    Neutral,
}

impl SignalKind {
    pub fn headline(&self) -> &'static str {
        match self {
            SignalKind::Sell => "SELL NOW",
            SignalKind::Buy => "BUY NOW",
            SignalKind::WaitHold => "WAIT (HOLD)",
            SignalKind::WaitMonitor => "WAIT (MONITOR)",
            SignalKind::Neutral => "NEUTRAL",
        }
    }
}

/// Short-term price action derived from 5-day momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceAction {
    PushingHigher,
    Rejecting,
    Steady,
}

/// The zone the current price sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneHit {
    pub level: usize,
    pub kind: ZoneKind,
}

/// Numeric context reported with every signal, regardless of branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub current_price: f64,
    pub baseline: f64,
    pub distance_from_baseline_pct: f64,
    pub distance_from_high_pct: f64,
    pub distance_from_low_pct: f64,
    pub historical_high: f64,
    pub historical_low: f64,
    pub recent_high: f64,
    pub recent_low: f64,
    pub momentum_pct: f64,
    /// Percent rise needed to reach the tightest take-profit level.
    pub distance_to_first_tp_pct: f64,
    /// Percent fall needed to reach the tightest buy level.
    pub distance_to_first_buy_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub description: String,
    pub recommendation: String,
    pub zone: Option<ZoneHit>,
    pub next_zone_level: Option<usize>,
    pub price_action: PriceAction,
    pub near_historical_high: bool,
    pub near_historical_low: bool,
    pub metrics: SignalMetrics,
}

impl Signal {
    pub fn headline(&self) -> &'static str {
        self.kind.headline()
    }
}

/// Classify `current_price` against the final values of `baseline`/`bands`.
///
/// `history` supplies momentum and the 1-year high/low; it is typically the
/// full series ending at the current bar.
pub fn classify(
    current_price: f64,
    baseline: f64,
    bands: &[Band],
    history: &[PriceBar],
    active_zones: &ActiveZones,
) -> Result<Signal, ClassifyError> {
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(ClassifyError::InvalidPrice(current_price));
    }
    if history.is_empty() {
        return Err(ClassifyError::EmptyHistory);
    }
    let first = bands.first().ok_or(ClassifyError::NoBands)?;
    let first_lower = first.last_lower().ok_or(ClassifyError::NoBands)?;
    let first_upper = first.last_upper().ok_or(ClassifyError::NoBands)?;

    let (zone, next_zone_level) = locate_zone(current_price, bands, active_zones);

    let lookback = &history[history.len().saturating_sub(TRADING_DAYS_PER_YEAR)..];
    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let historical_high = max_high(lookback);
    let historical_low = min_low(lookback);

    let momentum_pct = momentum_pct(current_price, history);
    let price_action = if momentum_pct > MOMENTUM_THRESHOLD_PCT {
        PriceAction::PushingHigher
    } else if momentum_pct < -MOMENTUM_THRESHOLD_PCT {
        PriceAction::Rejecting
    } else {
        PriceAction::Steady
    };

    let metrics = SignalMetrics {
        current_price,
        baseline,
        distance_from_baseline_pct: pct_change(current_price, baseline),
        distance_from_high_pct: pct_change(current_price, historical_high),
        distance_from_low_pct: pct_change(current_price, historical_low),
        historical_high,
        historical_low,
        recent_high: max_high(recent),
        recent_low: min_low(recent),
        momentum_pct,
        distance_to_first_tp_pct: (first_upper - current_price) / current_price * 100.0,
        distance_to_first_buy_pct: (current_price - first_lower) / current_price * 100.0,
    };

    let near_historical_high = current_price / historical_high > NEAR_HIGH_RATIO;
    let near_historical_low = current_price / historical_low < NEAR_LOW_RATIO;

    let tolerance = BASELINE_EPSILON * baseline.abs();
    let above = current_price - baseline > tolerance;
    let below = baseline - current_price > tolerance;

    let kind = match zone {
        Some(ZoneHit {
            kind: ZoneKind::Sell,
            ..
        }) if above => SignalKind::Sell,
        Some(ZoneHit {
            kind: ZoneKind::Buy,
            ..
        }) if below => SignalKind::Buy,
        None if above => SignalKind::WaitHold,
        None if below => SignalKind::WaitMonitor,
        _ => SignalKind::Neutral,
    };

    let ctx = narrative::Context {
        zone_level: zone.map(|z| z.level),
        next_zone_level,
        price_action,
        near_high: near_historical_high,
        near_low: near_historical_low,
        metrics: &metrics,
    };
    let (description, recommendation) = narrative::compose(kind, &ctx);

    Ok(Signal {
        kind,
        description,
        recommendation,
        zone,
        next_zone_level,
        price_action,
        near_historical_high,
        near_historical_low,
        metrics,
    })
}

/// First band (tightest first) the price falls outside of, plus the next zone beyond it.
fn locate_zone(
    price: f64,
    bands: &[Band],
    active_zones: &ActiveZones,
) -> (Option<ZoneHit>, Option<usize>) {
    let max_level = bands.iter().map(|b| b.level).max().unwrap_or(0);

    for band in bands {
        let (Some(lower), Some(upper)) = (band.last_lower(), band.last_upper()) else {
            continue;
        };
        if price < lower {
            let next = (band.level < max_level).then_some(band.level + 1);
            return (
                Some(ZoneHit {
                    level: band.level,
                    kind: ZoneKind::Buy,
                }),
                next,
            );
        }
        if price > upper && active_zones.contains(band.level) {
            let next = active_zones
                .next_above(band.level)
                .filter(|&level| level <= max_level);
            return (
                Some(ZoneHit {
                    level: band.level,
                    kind: ZoneKind::Sell,
                }),
                next,
            );
        }
    }
    (None, None)
}

/// Percent move from the first close of the 5-row window to `current`.
fn momentum_pct(current: f64, history: &[PriceBar]) -> f64 {
    let reference = if history.len() >= MOMENTUM_WINDOW {
        history[history.len() - MOMENTUM_WINDOW].close
    } else {
        current
    };
    pct_change(current, reference)
}

fn pct_change(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (value - reference) / reference * 100.0
}

fn max_high(bars: &[PriceBar]) -> f64 {
    bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max)
}

fn min_low(bars: &[PriceBar]) -> f64 {
    bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min)
}
