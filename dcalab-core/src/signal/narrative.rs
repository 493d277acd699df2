//! Plain-text description and recommendation for each signal branch.

use super::{PriceAction, SignalKind, SignalMetrics};

pub(super) struct Context<'a> {
    pub zone_level: Option<usize>,
    pub next_zone_level: Option<usize>,
    pub price_action: PriceAction,
    pub near_high: bool,
    pub near_low: bool,
    pub metrics: &'a SignalMetrics,
}

/// Returns `(description, recommendation)`.
pub(super) fn compose(kind: SignalKind, ctx: &Context<'_>) -> (String, String) {
    match kind {
        SignalKind::Sell => sell(ctx),
        SignalKind::Buy => buy(ctx),
        SignalKind::WaitHold => wait_hold(ctx),
        SignalKind::WaitMonitor => wait_monitor(ctx),
        SignalKind::Neutral => neutral(ctx),
    }
}

fn sell(ctx: &Context<'_>) -> (String, String) {
    let m = ctx.metrics;
    let level = ctx.zone_level.unwrap_or(1);
    let zone = format!("Take Profit Zone {level}");

    let context = match (ctx.price_action, ctx.next_zone_level) {
        (PriceAction::PushingHigher, Some(next)) => format!(
            "Momentum is strong (+{:.1}% over 5 days) and pushing toward Take Profit Zone {next}.",
            m.momentum_pct
        ),
        (PriceAction::PushingHigher, None) => format!(
            "Momentum is strong (+{:.1}% over 5 days) and may extend higher.",
            m.momentum_pct
        ),
        (PriceAction::Rejecting, _) => format!(
            "Price is rejecting ({:.1}% over 5 days) and showing weakness.",
            m.momentum_pct
        ),
        (PriceAction::Steady, _) => "Price is consolidating at this level.".to_string(),
    };
    let description = format!(
        "Price is +{:.1}% above the baseline in {zone}. {context}",
        m.distance_from_baseline_pct
    );

    let pct_of_high = m.current_price / m.historical_high * 100.0;
    let below_high = gap_pct(m.historical_high - m.current_price, m.current_price);
    let recommendation = if ctx.near_high {
        match (ctx.price_action, ctx.next_zone_level) {
            (PriceAction::PushingHigher, Some(next)) => format!(
                "Price is pushing through {zone} toward Take Profit Zone {next}. \
                 Consider taking 25-50% profits now and watch daily action; exit on rejection. \
                 Near the 1-year high, reversal risk is elevated."
            ),
            (PriceAction::Rejecting, _) => format!(
                "Sell at {zone} now. Price is rejecting at {pct_of_high:.1}% of the 1-year high. \
                 Sell 75-100% of the position to lock in gains."
            ),
            _ => format!(
                "Take profits at {zone}. Price is at {pct_of_high:.1}% of the 1-year high. \
                 Consider selling 50-75% now; hold the remainder only if price breaks higher."
            ),
        }
    } else {
        match (ctx.price_action, ctx.next_zone_level) {
            (PriceAction::PushingHigher, Some(next)) => format!(
                "Momentum is strong. Consider taking 25% profits at {zone} and holding the \
                 remainder for Take Profit Zone {next}. Sell more if rejection appears. \
                 Distance to the 1-year high: {below_high:.1}%."
            ),
            (PriceAction::Rejecting, _) => format!(
                "Price is rejecting at {zone}. Sell 50-75% of the position now and set a stop \
                 for the remainder at the zone entry level."
            ),
            _ => format!(
                "Take profits at {zone}. Price is {below_high:.1}% below the 1-year high. \
                 Sell 25-50% now; strong closes above suggest higher zones, weak closes signal an exit."
            ),
        }
    };
    (description, recommendation)
}

fn buy(ctx: &Context<'_>) -> (String, String) {
    let m = ctx.metrics;
    let level = ctx.zone_level.unwrap_or(1);
    let zone = format!("DCA Buy Zone {level}");

    let context = match (ctx.price_action, ctx.next_zone_level) {
        (PriceAction::Rejecting, Some(next)) => format!(
            "Price is falling ({:.1}% over 5 days) and may reach Buy Zone {next}.",
            m.momentum_pct
        ),
        (PriceAction::Rejecting, None) => format!(
            "Price is declining ({:.1}% over 5 days); a deeper entry is possible.",
            m.momentum_pct
        ),
        (PriceAction::PushingHigher, _) => format!(
            "Price is bouncing (+{:.1}% over 5 days); support has been found.",
            m.momentum_pct
        ),
        (PriceAction::Steady, _) => "Price is stabilizing at this level.".to_string(),
    };
    let description = format!(
        "Price is {:.1}% below the baseline in {zone}. {context}",
        -m.distance_from_baseline_pct
    );

    let above_low = gap_pct(m.current_price - m.historical_low, m.current_price);
    let next_label = ctx
        .next_zone_level
        .map(|n| format!("Buy Zone {n}"))
        .unwrap_or_else(|| "a deeper pullback".to_string());
    let recommendation = if ctx.near_low {
        match (ctx.price_action, ctx.next_zone_level) {
            (PriceAction::Rejecting, Some(next)) => format!(
                "At {zone} near the 1-year low with price still falling. \
                 Consider splitting the buy: 2.5X now and 2.5X if Buy Zone {next} is reached."
            ),
            (PriceAction::PushingHigher, _) => format!(
                "Buy at {zone}. Price is bouncing {above_low:.1}% above the 1-year low. \
                 Execute the full 5X DCA buy."
            ),
            _ => format!(
                "Accumulate at {zone} near the 1-year low. Execute 5X DCA buys; \
                 the next opportunity is {next_label}."
            ),
        }
    } else {
        match (ctx.price_action, ctx.next_zone_level) {
            (PriceAction::Rejecting, Some(next)) => format!(
                "At {zone} with downward momentum. Execute 3X DCA now and reserve 2X for Buy Zone {next}."
            ),
            (PriceAction::PushingHigher, _) => format!(
                "Strong buy at {zone}. Price is bouncing off support. Execute the full 5X DCA buy. \
                 Distance to the 1-year low: {above_low:.1}%."
            ),
            _ => format!(
                "Execute 5X DCA buys at {zone}. Price is {above_low:.1}% above the 1-year low; \
                 further drops are better entries."
            ),
        }
    };
    (description, recommendation)
}

fn wait_hold(ctx: &Context<'_>) -> (String, String) {
    let m = ctx.metrics;
    (
        format!(
            "Price is +{:.1}% above the baseline but below the take-profit zones.",
            m.distance_from_baseline_pct
        ),
        format!(
            "Hold positions and wait for Take Profit Zone 1. Price needs to rise {:.1}% to reach it. \
             Continue daily DCA only.",
            m.distance_to_first_tp_pct.max(0.0)
        ),
    )
}

fn wait_monitor(ctx: &Context<'_>) -> (String, String) {
    let m = ctx.metrics;
    (
        format!(
            "Price is {:.1}% below the baseline but above the buy zones.",
            -m.distance_from_baseline_pct
        ),
        format!(
            "Monitor for a deeper pullback to DCA Buy Zone 1. Price needs to fall {:.1}% to reach it. \
             Execute daily DCA only until a zone signal confirms.",
            m.distance_to_first_buy_pct.max(0.0)
        ),
    )
}

/// `gap` as a percent of the current price.
fn gap_pct(gap: f64, price: f64) -> f64 {
    if price > 0.0 {
        gap / price * 100.0
    } else {
        0.0
    }
}

fn neutral(ctx: &Context<'_>) -> (String, String) {
    let m = ctx.metrics;
    (
        format!(
            "Price is trading near the baseline ({:+.1}%).",
            m.distance_from_baseline_pct
        ),
        format!(
            "Execute standard daily DCA only. Wait for a zone entry: a {:.1}% fall for a buy \
             signal or a {:.1}% rise for a sell signal.",
            m.distance_to_first_buy_pct.max(0.0),
            m.distance_to_first_tp_pct.max(0.0)
        ),
    )
}
