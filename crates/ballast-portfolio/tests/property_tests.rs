//! Property-based tests for allocation invariants.
//!
//! These tests verify properties that should always hold:
//! - Feasible bounds always succeed, with weights summing to 1 inside the bounds
//! - Infeasible bounds fail with no weights and a reason
//! - The optimum is never worse than the uniform start
//! - Evaluated return lies within the range of the expected returns

use ballast_portfolio::prelude::*;
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// Deterministic pseudo-random stream from a seed.
fn simple_hash(seed: u64, i: u64) -> u64 {
    let mut h = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ i.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 31;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 29)
}

/// Uniform sample in `[-1, 1)`.
fn unit_noise(seed: u64, i: u64) -> f64 {
    (simple_hash(seed, i) % 2_000_001) as f64 / 1_000_000.0 - 1.0
}

fn generate_case(n: usize, periods: usize, seed: u64) -> (Vec<Asset>, PriceHistory) {
    let bought = Date::from_ymd(2022, 6, 1).unwrap();
    let mut assets = Vec::with_capacity(n);
    let mut history = PriceHistory::new();

    for i in 0..n {
        let base = seed.wrapping_add(1_000 * i as u64);
        let drift = 0.002 * unit_noise(base, 0);
        let vol = 0.005 + 0.02 * unit_noise(base, 1).abs();
        let mut price = 10.0 + 90.0 * unit_noise(base, 2).abs();
        let mut prices = vec![price];
        for t in 0..periods {
            price *= 1.0 + drift + vol * unit_noise(base, 10 + t as u64);
            prices.push(price);
        }

        let symbol = format!("A{i}");
        let shares = simple_hash(base, 3) % 500;
        let esg = (simple_hash(base, 4) % 101) as f64;
        assets.push(
            Asset::new(symbol.clone(), shares, price, bought)
                .unwrap()
                .with_esg_score(esg)
                .unwrap(),
        );
        history.insert(symbol, prices);
    }

    (assets, history)
}

fn as_of() -> Date {
    Date::from_ymd(2024, 3, 1).unwrap()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_feasible_bounds_yield_feasible_weights(
        n in 2usize..9,
        periods in 12usize..40,
        seed in any::<u64>(),
        risk_tolerance in 0.0f64..3.0,
        lower_frac in 0.0f64..1.0,
        upper_frac in 0.0f64..1.0,
    ) {
        // Bounds drawn so that n × lower <= 1 <= n × upper
        let lower = lower_frac / n as f64;
        let upper = 1.0 / n as f64 + upper_frac * (1.0 - 1.0 / n as f64);
        let (assets, history) = generate_case(n, periods, seed);
        let request = OptimizationRequest::new(assets, risk_tolerance, as_of())
            .with_optimizer(OptimizerConfig::new().with_bounds(lower, upper));

        let report = optimize_portfolio(&request, &history);

        prop_assert!(report.success, "{}", report.message);
        prop_assert_eq!(report.weights.len(), n);
        prop_assert!((report.weight_sum() - 1.0).abs() <= 1e-6);
        for (symbol, w) in &report.weights {
            prop_assert!(
                *w >= lower - 1e-9 && *w <= upper + 1e-9,
                "{} = {} outside [{}, {}]", symbol, w, lower, upper
            );
        }
        prop_assert!(
            report.objective_value.unwrap() <= report.initial_objective_value.unwrap() + 1e-12
        );
    }

    #[test]
    fn prop_infeasible_bounds_never_reach_the_solver(
        n in 2usize..9,
        seed in any::<u64>(),
        slack in 0.01f64..0.5,
    ) {
        let upper = (1.0 - slack) / n as f64;
        let (assets, history) = generate_case(n, 20, seed);
        let request = OptimizationRequest::new(assets, 0.5, as_of())
            .with_optimizer(OptimizerConfig::new().with_bounds(0.0, upper));

        let report = optimize_portfolio(&request, &history);

        prop_assert!(!report.success);
        prop_assert_eq!(report.error_kind, Some(ErrorKind::InfeasibleConstraints));
        prop_assert_eq!(report.iterations, 0);
        prop_assert!(report.weights.is_empty());
        prop_assert!(!report.message.is_empty());
    }

    #[test]
    fn prop_reports_are_deterministic(
        n in 2usize..6,
        seed in any::<u64>(),
        risk_tolerance in 0.0f64..2.0,
    ) {
        let (assets, history) = generate_case(n, 24, seed);
        let request = OptimizationRequest::new(assets, risk_tolerance, as_of())
            .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0));

        let first = optimize_portfolio(&request, &history);
        let second = optimize_portfolio(&request, &history);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_evaluated_return_within_asset_range(
        raw in prop::collection::vec(0.01f64..1.0, 2..8),
        returns_seed in any::<u64>(),
    ) {
        let n = raw.len();
        let total: f64 = raw.iter().sum();
        let w = DVector::from_iterator(n, raw.iter().map(|x| x / total));
        let mu = DVector::from_iterator(
            n,
            (0..n).map(|i| 0.05 * unit_noise(returns_seed, i as u64)),
        );
        let cov = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.01 + 0.001 * i as f64
            } else {
                0.002
            }
        });

        let metrics = evaluate(&w, &mu, &cov).unwrap();

        prop_assert!(metrics.expected_return >= mu.min() - 1e-12);
        prop_assert!(metrics.expected_return <= mu.max() + 1e-12);
        prop_assert!(metrics.risk >= 0.0);
    }
}
