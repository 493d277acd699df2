//! Integration tests for the fit → detect → classify → simulate pipeline.

use chrono::NaiveDate;
use dcalab_core::domain::{ActiveZones, Band, BandStyle, PriceBar, ZoneKind};
use dcalab_core::engine::{simulate, SimulationConfig};
use dcalab_core::fit::{fit, FitVariant};
use dcalab_core::signal::classify;
use dcalab_core::zones::{detect_buy_signals, detect_sell_signals};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// 252 rows oscillating around a linear uptrend: 12 full 21-day cycles.
///
/// Highs and lows sit 2.0 either side of the close so the bar range pokes
/// through the first band at each peak and trough.
fn sinusoid_on_uptrend(n: usize) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 0.1 * t + 8.0 * (2.0 * std::f64::consts::PI * t / 21.0).sin();
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

// ──────────────────────────────────────────────
// End-to-end scenario
// ──────────────────────────────────────────────

#[test]
fn end_to_end_sinusoid_scenario() {
    let bars = sinusoid_on_uptrend(252);
    let fitted = fit(&closes(&bars), 2, 4, FitVariant::Enhanced).unwrap();
    assert_eq!(fitted.effective_degree(), 2);

    let result = simulate(
        &bars,
        &fitted.baseline.values,
        &fitted.bands,
        &SimulationConfig::new(10_000.0, 1.0),
    )
    .unwrap();

    assert!(result.daily_buy_count + result.zone_buy_count > 0);
    assert!((result.daily_dca_amount - 10_000.0 / 252.0).abs() < 1e-9);

    let expected = result.daily_dca_amount
        * (result.daily_buy_count as f64 + 5.0 * result.zone_buy_count as f64);
    assert!((result.total_invested - expected).abs() < 1.0);

    assert!(result.sell_count > 0);
    assert!(result.positions.iter().any(|p| p.sell_date.is_some()));
    assert_eq!(result.snapshots.len(), 252);
    assert_eq!(result.trading_days, 252);
}

#[test]
fn oscillation_crosses_bands_both_ways() {
    let bars = sinusoid_on_uptrend(252);
    let fitted = fit(&closes(&bars), 2, 4, FitVariant::Enhanced).unwrap();

    let buys = detect_buy_signals(&bars, &fitted.bands);
    let sells = detect_sell_signals(&bars, &fitted.bands);
    assert!(!buys.is_empty());
    assert!(!sells.is_empty());
    assert!(buys.iter().all(|e| e.kind == ZoneKind::Buy && e.zone_level == 1));
    assert!(sells.iter().all(|e| e.kind == ZoneKind::Sell && e.zone_level == 1));
}

// ──────────────────────────────────────────────
// Edge cases
// ──────────────────────────────────────────────

#[test]
fn price_never_below_baseline_invests_nothing() {
    let bars = sinusoid_on_uptrend(120);
    let baseline: Vec<f64> = bars.iter().map(|b| b.low - 50.0).collect();
    let bands: Vec<Band> = (1..=4)
        .map(|level| Band {
            level,
            lower: baseline.iter().map(|v| v - 100.0 * level as f64).collect(),
            upper: baseline.iter().map(|v| v + 1_000.0 * level as f64).collect(),
            style: BandStyle::for_level(level),
        })
        .collect();

    let result = simulate(&bars, &baseline, &bands, &SimulationConfig::new(5_000.0, 1.0)).unwrap();
    assert_eq!(result.daily_buy_count, 0);
    assert_eq!(result.zone_buy_count, 0);
    assert_eq!(result.total_invested, 0.0);
    assert_eq!(result.roi_percentage, 0.0);
    assert!(result.snapshots.iter().all(|s| s.portfolio_value == 0.0));
}

#[test]
fn deactivating_zones_suppresses_sells() {
    let bars = sinusoid_on_uptrend(252);
    let fitted = fit(&closes(&bars), 2, 4, FitVariant::Enhanced).unwrap();
    let mut config = SimulationConfig::new(10_000.0, 1.0);
    config.active_zones = ActiveZones::from_levels([3, 4]);

    let result = simulate(&bars, &fitted.baseline.values, &fitted.bands, &config).unwrap();
    assert_eq!(result.sell_count, 0);
    assert!(result.positions.iter().all(|p| p.is_open()));
    assert!((result.unrealized_pl(bars[251].close) - result.total_return).abs() < 1e-6);
}

#[test]
fn classify_latest_bar_of_fitted_series() {
    let bars = sinusoid_on_uptrend(252);
    let fitted = fit(&closes(&bars), 2, 4, FitVariant::Enhanced).unwrap();
    let last = bars[251].close;
    let baseline = fitted.baseline.last().unwrap();

    let signal = classify(last, baseline, &fitted.bands, &bars, &ActiveZones::all(4)).unwrap();
    let m = &signal.metrics;
    assert!((m.distance_from_baseline_pct - (last - baseline) / baseline * 100.0).abs() < 1e-9);
    assert!(m.historical_high >= m.recent_high);
    assert!(m.historical_low <= m.recent_low);
    assert!(!signal.recommendation.is_empty());
}
