//! Property tests for degree sweep construction and best-candidate selection.

use dcalab_core::fit::{FitError, FitVariant};
use dcalab_runner::optimizer::{select_best, CandidateError, CandidateOutcome, DegreeResult};
use dcalab_runner::OptimizerConfig;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_config() -> impl Strategy<Value = OptimizerConfig> {
    (1usize..50, 0usize..60, 1usize..10).prop_map(|(min, span, step)| OptimizerConfig {
        min_degree: min,
        max_degree: min + span,
        step,
        num_bands: 4,
        variant: FitVariant::Enhanced,
        parallel: false,
    })
}

fn success(degree: usize, roi: f64) -> CandidateOutcome {
    CandidateOutcome::Success(DegreeResult {
        degree,
        effective_degree: degree,
        roi_percentage: roi,
        total_return: roi,
        total_invested: 100.0,
        daily_buy_count: 1,
        zone_buy_count: 0,
        sell_count: 0,
    })
}

/// Outcomes in degree order `1..=len`; `None` marks a failed candidate.
/// ROIs come from a small grid so ties are common.
fn arb_outcomes() -> impl Strategy<Value = Vec<Option<i32>>> {
    prop::collection::vec(prop::option::weighted(0.8, -3i32..4), 0..25)
}

fn build(rois: &[Option<i32>]) -> Vec<CandidateOutcome> {
    rois.iter()
        .enumerate()
        .map(|(i, roi)| match roi {
            Some(r) => success(i + 1, *r as f64),
            None => CandidateOutcome::Failed {
                degree: i + 1,
                error: CandidateError::Fit(FitError::InvalidBandCount),
            },
        })
        .collect()
}

// ── Degree grid ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn degrees_stay_in_range_and_step_evenly(config in arb_config()) {
        let degrees = config.degrees();
        prop_assert_eq!(degrees.first().copied(), Some(config.min_degree));
        prop_assert!(degrees.iter().all(|&d| d <= config.max_degree));
        prop_assert!(degrees.windows(2).all(|w| w[1] - w[0] == config.step));
        // No room for another step past the last degree.
        let last = *degrees.last().unwrap();
        prop_assert!(last + config.step > config.max_degree);
    }
}

// ── Selection ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ties_keep_the_smallest_degree(rois in arb_outcomes()) {
        let result = select_best(1, build(&rois));

        let best = rois.iter().flatten().max().copied();
        match best {
            None => {
                prop_assert!(result.is_exhausted());
                prop_assert_eq!(result.optimal_degree, 1);
            }
            Some(best) => {
                let first = rois.iter().position(|r| *r == Some(best)).unwrap() + 1;
                prop_assert_eq!(result.optimal_degree, first);
                prop_assert_eq!(result.best_roi, best as f64);
            }
        }
        prop_assert_eq!(
            result.all_results.len() + result.skipped.len(),
            rois.len()
        );
    }
}
