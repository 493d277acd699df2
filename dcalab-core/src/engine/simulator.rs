//! Day-by-day DCA replay.
//!
//! Each simulated day runs four phases in a fixed order:
//! 1. Take-profit: sell the whole balance on the first active upper-band crossing
//! 2. Dividend: every 90th day, pay and reinvest (stocks only)
//! 3. Buy: 5X on a confirmed zone-buy date, else daily DCA below the baseline
//! 4. Snapshot: record portfolio value and cumulative investment
//!
//! The order decides whether a same-day sell-then-buy or dividend-then-buy occurs.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::domain::{ActiveZones, Band, BuyType, PriceBar};
use crate::zones::detect_buy_signals;

use super::state::{
    DcaStrategy, Ledger, NextTarget, SimulationConfig, SimulationResult, DIVIDEND_INTERVAL_DAYS,
    ZONE_BUY_MULTIPLIER,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("misaligned inputs: series={series}, baseline={baseline}, band {level} has {band}")]
    Misaligned {
        series: usize,
        baseline: usize,
        level: usize,
        band: usize,
    },

    #[error("budget must be a positive finite amount, got {0}")]
    InvalidBudget(f64),
}

/// Replay `bars` against the fitted `baseline` and `bands`.
///
/// All inputs must be aligned 1:1. An empty series yields an all-zero result.
pub fn simulate(
    bars: &[PriceBar],
    baseline: &[f64],
    bands: &[Band],
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    if !config.total_budget.is_finite() || config.total_budget <= 0.0 {
        return Err(SimulationError::InvalidBudget(config.total_budget));
    }
    check_alignment(bars, baseline, bands)?;

    let Some(last) = bars.last() else {
        return Ok(SimulationResult::empty(config.horizon_years));
    };

    let days = bars.len();
    let daily_dca_amount = config.total_budget / days as f64;

    let zone_buys = match config.strategy {
        DcaStrategy::ZoneMultiplier => zone_buy_levels(bars, bands),
        DcaStrategy::Simplified => HashMap::new(),
    };
    let dividend_per_share = config
        .dividend
        .filter(|_| config.pays_dividends())
        .map(|d| d.quarterly_per_share());

    let mut ledger = Ledger::with_capacity(days);

    for i in 0..days {
        let bar = &bars[i];

        // ─── Phase 1: Take-profit ───
        if ledger.shares > 0.0 && i > 0 {
            if let Some(level) = take_profit_level(bars, bands, &config.active_zones, i) {
                debug!(date = %bar.date, level, shares = ledger.shares, "take-profit sell-all");
                ledger.sell_all(bar.date, bar.close, level);
            }
        }

        // ─── Phase 2: Dividend ───
        if let Some(per_share) = dividend_per_share {
            if ledger.shares > 0.0 && i > 0 && i % DIVIDEND_INTERVAL_DAYS == 0 {
                ledger.reinvest_dividend(per_share, bar.close);
            }
        }

        // ─── Phase 3: Buy ───
        if let Some(&level) = zone_buys.get(&bar.date) {
            ledger.buy(
                bar.date,
                bar.close,
                BuyType::ZoneMultiplier,
                level,
                daily_dca_amount * ZONE_BUY_MULTIPLIER,
            );
        } else if bar.close < baseline[i] {
            ledger.buy(bar.date, bar.close, BuyType::Daily, 0, daily_dca_amount);
        }

        // ─── Phase 4: Snapshot ───
        ledger.snapshot(bar);
    }

    let current_value = ledger.shares * last.close;
    let total_return = ledger.realized_cash + current_value - ledger.total_invested;
    let roi_percentage = if ledger.total_invested > 0.0 {
        total_return / ledger.total_invested * 100.0
    } else {
        0.0
    };

    debug!(
        days,
        invested = ledger.total_invested,
        roi_percentage,
        sells = ledger.sell_count,
        "simulation complete"
    );

    Ok(SimulationResult {
        total_invested: ledger.total_invested,
        shares_held: ledger.shares,
        realized_cash: ledger.realized_cash,
        current_value,
        dividend_income: ledger.dividend_income,
        dividend_shares: ledger.dividend_shares,
        dividend_shares_value: ledger.dividend_shares * last.close,
        total_return,
        roi_percentage,
        next_tp: next_take_profit(bands, last.close),
        daily_buy_count: ledger.daily_buy_count,
        zone_buy_count: ledger.zone_buy_count,
        sell_count: ledger.sell_count,
        daily_dca_amount,
        trading_days: days,
        horizon_years: config.horizon_years,
        positions: ledger.positions,
        trades: ledger.trades,
        snapshots: ledger.snapshots,
    })
}

/// Lowest last-step upper band above `last_close`, across all bands.
pub fn next_take_profit(bands: &[Band], last_close: f64) -> Option<NextTarget> {
    bands
        .iter()
        .filter_map(|band| {
            band.last_upper()
                .filter(|&price| price > last_close)
                .map(|price| NextTarget {
                    level: band.level,
                    price,
                })
        })
        .fold(None, |best: Option<NextTarget>, candidate| match best {
            Some(b) if b.price <= candidate.price => Some(b),
            _ => Some(candidate),
        })
}

fn check_alignment(
    bars: &[PriceBar],
    baseline: &[f64],
    bands: &[Band],
) -> Result<(), SimulationError> {
    let misaligned = |level: usize, band: usize| SimulationError::Misaligned {
        series: bars.len(),
        baseline: baseline.len(),
        level,
        band,
    };
    if baseline.len() != bars.len() {
        return Err(misaligned(0, 0));
    }
    for band in bands {
        if band.lower.len() != bars.len() || band.upper.len() != bars.len() {
            return Err(misaligned(band.level, band.lower.len().min(band.upper.len())));
        }
    }
    Ok(())
}

/// Date → level of the confirmed buy-zone crossings. The widest level wins on a shared date.
fn zone_buy_levels(bars: &[PriceBar], bands: &[Band]) -> HashMap<NaiveDate, usize> {
    detect_buy_signals(bars, bands)
        .into_iter()
        .map(|event| (event.date, event.zone_level))
        .collect()
}

/// First active level (ascending) whose upper band was crossed on day `i`.
fn take_profit_level(
    bars: &[PriceBar],
    bands: &[Band],
    active_zones: &ActiveZones,
    i: usize,
) -> Option<usize> {
    let today = &bars[i];
    let yesterday = &bars[i - 1];
    let mut ordered: Vec<&Band> = bands.iter().collect();
    ordered.sort_by_key(|b| b.level);
    ordered
        .into_iter()
        .filter(|band| active_zones.contains(band.level))
        .find(|band| {
            let zone = band.upper[i];
            yesterday.high < band.upper[i - 1] && (today.high >= zone || today.close >= zone)
        })
        .map(|band| band.level)
}
