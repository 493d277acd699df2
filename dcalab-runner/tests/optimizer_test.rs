//! Integration tests for the intensity optimizer.

use chrono::NaiveDate;
use dcalab_core::data::DateRange;
use dcalab_core::domain::{ActiveZones, PriceBar, PriceSeries};
use dcalab_core::engine::{DcaStrategy, SimulationConfig};
use dcalab_core::fit::FitVariant;
use dcalab_runner::{
    load_from, optimize, LoadedSeries, OptimizationResult, OptimizerConfig, SyntheticProvider,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn synthetic(symbol: &str) -> LoadedSeries {
    load_from(&SyntheticProvider, symbol, DateRange::default()).unwrap()
}

fn sweep(min: usize, max: usize, step: usize, parallel: bool) -> OptimizerConfig {
    OptimizerConfig {
        min_degree: min,
        max_degree: max,
        step,
        num_bands: 4,
        variant: FitVariant::Enhanced,
        parallel,
    }
}

// ── Selection ────────────────────────────────────────────────────────

/// Two years of closes on `50 + 40 (u - vertex)^2` for `u` in `[-1, 1]`, plus a
/// ±0.2 zig-zag. Only the second year falls inside a one-year horizon.
///
/// A line leaves residuals `40 (u^2 - 1/3)`, so degree 1 buys only while
/// `u < 0.577`: the first ~58% of the horizon. Degree 2 matches the bowl and
/// buys on every down-zig across the whole horizon.
fn bowl(vertex: f64) -> PriceSeries {
    let n = 504;
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let bars = (0..n)
        .map(|t| {
            let u = -1.0 + 2.0 * t as f64 / (n - 1) as f64;
            let zig = if t % 2 == 0 { 0.2 } else { -0.2 };
            let close = 50.0 + 40.0 * (u - vertex).powi(2) + zig;
            PriceBar {
                date: start + chrono::Duration::days(t as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            }
        })
        .collect();
    PriceSeries::new("BOWL", bars).unwrap()
}

/// Plain daily DCA with no exits, so ROI only depends on where buys land.
fn buy_and_hold() -> SimulationConfig {
    let mut sim = SimulationConfig::new(10_000.0, 1.0);
    sim.strategy = DcaStrategy::Simplified;
    sim.active_zones = ActiveZones::none();
    sim
}

fn assert_strict_winner(result: &OptimizationResult, expected: usize) {
    assert!(!result.is_exhausted());
    assert_eq!(result.optimal_degree, expected);
    let winner = result.best().unwrap();
    assert_eq!(winner.degree, expected);
    for other in result.all_results.iter().filter(|r| r.degree != expected) {
        assert!(
            other.roi_percentage < winner.roi_percentage - 5.0,
            "degree {} ({:.2}%) is too close to degree {expected} ({:.2}%)",
            other.degree,
            other.roi_percentage,
            winner.roi_percentage
        );
    }
}

#[test]
fn falling_horizon_favors_the_degree_that_spreads_buys() {
    // Horizon prices fall from 140 to 60, so the last close is the low:
    // buying late loses least. Degree 1 only buys early (~-44% vs ~-32%).
    let series = bowl(1.5);
    for variant in [FitVariant::Simple, FitVariant::Enhanced] {
        let mut config = sweep(1, 2, 1, false);
        config.variant = variant;
        let result = optimize(&series, &buy_and_hold(), &config).unwrap();
        assert_strict_winner(&result, 2);
        assert!(result.all_results.iter().all(|r| r.roi_percentage < 0.0));
    }
}

#[test]
fn rising_horizon_favors_the_degree_that_buys_early() {
    // Horizon prices rise from 60 to 140: early, cheap buys win (~+88% vs ~+59%).
    let series = bowl(-0.5);
    for variant in [FitVariant::Simple, FitVariant::Enhanced] {
        let mut config = sweep(1, 2, 1, true);
        config.variant = variant;
        let result = optimize(&series, &buy_and_hold(), &config).unwrap();
        assert_strict_winner(&result, 1);
        assert!(result.all_results.iter().all(|r| r.roi_percentage > 0.0));
    }
}

#[test]
fn optimal_degree_beats_every_other_candidate() {
    let loaded = synthetic("OPT");
    let sim = SimulationConfig::new(10_000.0, 1.0);
    let result = optimize(&loaded.series, &sim, &sweep(1, 12, 1, false)).unwrap();
    let best = result.best().unwrap();
    assert_eq!(best.roi_percentage, result.best_roi);
    // Earlier degrees never reach the winner's ROI; later ones never exceed it.
    for r in &result.all_results {
        if r.degree < best.degree {
            assert!(r.roi_percentage < best.roi_percentage);
        } else {
            assert!(r.roi_percentage <= best.roi_percentage);
        }
    }
}

#[test]
fn parallel_and_sequential_agree() {
    let loaded = synthetic("PAR");
    let sim = SimulationConfig::new(10_000.0, 1.0);

    let sequential = optimize(&loaded.series, &sim, &sweep(1, 30, 3, false)).unwrap();
    let parallel = optimize(&loaded.series, &sim, &sweep(1, 30, 3, true)).unwrap();
    assert_eq!(sequential, parallel);
    assert_eq!(
        parallel.all_results.iter().map(|r| r.degree).collect::<Vec<_>>(),
        (1..=30).step_by(3).collect::<Vec<_>>()
    );
}

#[test]
fn every_candidate_simulates_the_horizon_window() {
    let loaded = synthetic("WIN");
    let sim = SimulationConfig::new(5_000.0, 2.0);
    let result = optimize(&loaded.series, &sim, &sweep(2, 6, 2, false)).unwrap();
    for r in &result.all_results {
        // Daily allotment is budget / 504 rows, zone buys are 5x.
        let units = r.daily_buy_count as f64 + 5.0 * r.zone_buy_count as f64;
        assert!((r.total_invested - units * 5_000.0 / 504.0).abs() < 1e-6);
    }
}

// ── Exhaustion ───────────────────────────────────────────────────────

#[test]
fn all_failing_candidates_yield_sentinel() {
    let loaded = synthetic("BAD");
    // Zero budget is rejected by the simulator for every degree.
    let sim = SimulationConfig::new(0.0, 1.0);
    let result = optimize(&loaded.series, &sim, &sweep(3, 9, 3, true)).unwrap();
    assert!(result.is_exhausted());
    assert_eq!(result.optimal_degree, 3);
    assert_eq!(result.best_roi, f64::NEG_INFINITY);
    assert_eq!(result.skipped.len(), 3);
    assert!(result.all_results.is_empty());
}

#[test]
fn invalid_range_is_rejected_up_front() {
    let loaded = synthetic("RNG");
    let sim = SimulationConfig::new(10_000.0, 1.0);
    assert!(optimize(&loaded.series, &sim, &sweep(10, 2, 1, false)).is_err());
}
