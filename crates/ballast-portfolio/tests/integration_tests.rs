//! Integration tests for ballast-portfolio.
//!
//! These tests run the full pipeline on small, hand-checkable portfolios.

use approx::assert_relative_eq;
use ballast_portfolio::prelude::*;
use ballast_portfolio::{
    estimate, tolerance_for_target_risk, CovarianceAdjustment, PenaltyTerm,
    DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND,
};
use nalgebra::DVector;

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn bought() -> Date {
    Date::from_ymd(2023, 1, 1).unwrap()
}

fn as_of() -> Date {
    Date::from_ymd(2024, 1, 1).unwrap()
}

/// The three-asset scenario: steady climber, choppy mid-cap, large-cap.
fn three_asset_history() -> PriceHistory {
    PriceHistory::new()
        .with("AAA", vec![100.0, 101.0, 102.0, 103.0])
        .with("BBB", vec![50.0, 49.0, 51.0, 52.0])
        .with("CCC", vec![200.0, 202.0, 201.0, 205.0])
}

fn three_assets() -> Vec<Asset> {
    vec![
        Asset::new("AAA", 10, 103.0, bought())
            .unwrap()
            .with_esg_score(70.0)
            .unwrap(),
        Asset::new("BBB", 20, 52.0, bought())
            .unwrap()
            .with_esg_score(40.0)
            .unwrap(),
        Asset::new("CCC", 5, 205.0, bought())
            .unwrap()
            .with_esg_score(85.0)
            .unwrap(),
    ]
}

const SECTORS: [&str; 8] = ["TECH", "BANK", "UTIL", "OIL", "PHRM", "RETL", "TELE", "MINE"];

/// Deterministic cyclical price path: 25 prices, distinct drift and rhythm per index.
fn cyclical_path(i: usize) -> Vec<f64> {
    let drift = 0.002 * (i % 4) as f64 - 0.001;
    let amplitude = 0.01 + 0.005 * (i % 3) as f64;
    let frequency = 0.7 + 0.45 * i as f64;
    let mut price = 20.0 + 10.0 * i as f64;
    let mut path = vec![price];
    for t in 1..25 {
        price *= 1.0 + drift + amplitude * (frequency * t as f64 + i as f64).sin();
        path.push(price);
    }
    path
}

/// Eight assets with a full-rank covariance; the default 5%-30% bounds are feasible.
fn eight_asset_case() -> (Vec<Asset>, PriceHistory) {
    let paths: Vec<Vec<f64>> = (0..SECTORS.len()).map(cyclical_path).collect();
    let assets = SECTORS
        .iter()
        .zip(&paths)
        .enumerate()
        .map(|(i, (symbol, path))| {
            Asset::new(*symbol, 10 * (i as u64 + 1), path[path.len() - 1], bought())
                .unwrap()
                .with_esg_score(20.0 + 10.0 * i as f64)
                .unwrap()
        })
        .collect();
    let history = SECTORS.iter().copied().zip(paths).collect();
    (assets, history)
}

fn assert_weights_valid(report: &OptimizationReport, lower: f64, upper: f64) {
    assert!(report.success, "{}", report.message);
    assert_relative_eq!(report.weight_sum(), 1.0, epsilon = 1e-6);
    for (symbol, w) in &report.weights {
        assert!(
            *w >= lower - 1e-9 && *w <= upper + 1e-9,
            "{symbol} weight {w} outside [{lower}, {upper}]"
        );
    }
}

// =============================================================================
// END-TO-END SCENARIOS
// =============================================================================

#[test]
fn test_three_assets_with_widened_bounds() {
    let request = OptimizationRequest::new(three_assets(), 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.05, 0.5));

    let report = optimize_portfolio(&request, &three_asset_history());

    assert_weights_valid(&report, 0.05, 0.5);
    assert_eq!(report.symbols, vec!["AAA", "BBB", "CCC"]);
    assert!(report.objective_value.unwrap() <= report.initial_objective_value.unwrap() + 1e-12);
    assert!(report.optimized_performance.is_some());
    assert!(report.current_performance.is_some());
}

#[test]
fn test_three_assets_with_default_bounds_is_infeasible() {
    let request = OptimizationRequest::new(three_assets(), 0.1, as_of());
    assert_eq!(request.optimizer.upper_bound, DEFAULT_UPPER_BOUND);

    let report = optimize_portfolio(&request, &three_asset_history());

    assert!(!report.success);
    assert_eq!(report.error_kind, Some(ErrorKind::InfeasibleConstraints));
    assert_eq!(report.iterations, 0);
    assert!(report.objective_value.is_none());
    assert!(report.weights.is_empty());
}

#[test]
fn test_default_bounds_with_eight_assets() {
    let (assets, history) = eight_asset_case();
    let request = OptimizationRequest::new(assets, 0.5, as_of());

    let report = optimize_portfolio(&request, &history);

    assert_weights_valid(&report, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND);
    assert_eq!(report.target_shares.len(), 8);
    let breakdown = report.breakdown.unwrap();
    assert!(breakdown.tax_penalty.is_some());
    assert!(breakdown.esg_penalty.is_some());
}

#[test]
fn test_single_asset_is_insufficient_data() {
    let assets = vec![Asset::new("SOLO", 10, 100.0, bought()).unwrap()];
    let history = PriceHistory::new().with("SOLO", vec![100.0, 101.0, 99.0, 102.0]);
    let request = OptimizationRequest::new(assets, 0.1, as_of());

    let report = optimize_portfolio(&request, &history);

    assert!(!report.success);
    assert_eq!(report.error_kind, Some(ErrorKind::InsufficientData));
    assert!(report.weights.is_empty());
    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("NaN"));
}

#[test]
fn test_unusable_history_drops_asset() {
    let mut assets = three_assets();
    assets.push(Asset::new("FLAT", 1, 10.0, bought()).unwrap());
    let history = three_asset_history().with("FLAT", vec![10.0]);
    let request = OptimizationRequest::new(assets, 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 0.6));

    let report = optimize_portfolio(&request, &history);

    assert!(report.success, "{}", report.message);
    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].symbol, "FLAT");
    assert!(report.weight("FLAT").is_none());
}

#[test]
fn test_misaligned_histories() {
    let history = PriceHistory::new()
        .with("AAA", vec![100.0, 101.0, 102.0, 103.0])
        .with("BBB", vec![50.0, 49.0, 51.0])
        .with("CCC", vec![200.0, 202.0, 201.0, 205.0]);
    let request = OptimizationRequest::new(three_assets(), 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0));

    let report = optimize_portfolio(&request, &history);

    assert_eq!(report.error_kind, Some(ErrorKind::DataAlignment));
}

#[test]
fn test_missing_esg_rejected_when_asked() {
    let mut assets = three_assets();
    assets[1].esg_score = None;
    let request = OptimizationRequest::new(assets, 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0))
        .with_penalties(PenaltyConfig::new().with_esg_policy(EsgPolicy::Reject));

    let report = optimize_portfolio(&request, &three_asset_history());

    assert_eq!(report.error_kind, Some(ErrorKind::MissingEsgScore));
    assert!(report.message.contains("BBB"));
}

#[test]
fn test_singular_covariance_is_regularized() {
    // Four prices give three returns for three assets: rank-deficient
    let request = OptimizationRequest::new(three_assets(), 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0));

    let report = optimize_portfolio(&request, &three_asset_history());

    assert!(report.success, "{}", report.message);
    let CovarianceAdjustment { ridge, .. } = report.covariance_adjustment.unwrap();
    assert!(ridge > 0.0);
    assert!(!report.warnings.is_empty());
}

#[test]
fn test_condition_floor_controls_ridge() {
    let run = |floor: f64| {
        let request = OptimizationRequest::new(three_assets(), 0.1, as_of()).with_optimizer(
            OptimizerConfig::new()
                .with_bounds(0.0, 1.0)
                .with_condition_floor(floor),
        );
        optimize_portfolio(&request, &three_asset_history())
    };

    let default_floor = run(OptimizerConfig::new().condition_floor);
    let raised = run(1e-2);
    assert!(raised.success, "{}", raised.message);
    let default_ridge = default_floor.covariance_adjustment.unwrap().ridge;
    let raised_adjustment = raised.covariance_adjustment.unwrap();
    assert!(raised_adjustment.ridge > default_ridge);
    assert_relative_eq!(
        raised_adjustment.min_eigenvalue + raised_adjustment.ridge,
        1e-2 * raised_adjustment.max_eigenvalue,
        epsilon = 1e-12
    );

    let negative = run(-1.0);
    assert!(!negative.success);
    assert_eq!(negative.error_kind, Some(ErrorKind::InvalidInput));
}

// =============================================================================
// PROPERTIES OF THE OPTIMUM
// =============================================================================

#[test]
fn test_identical_inputs_identical_weights() {
    let (assets, history) = eight_asset_case();
    let request = OptimizationRequest::new(assets, 0.3, as_of());

    let first = optimize_portfolio(&request, &history);
    let second = optimize_portfolio(&request, &history);

    assert_eq!(first, second);
}

#[test]
fn test_higher_risk_tolerance_never_raises_risk() {
    let (assets, history) = eight_asset_case();
    let mut previous = f64::INFINITY;

    for lambda in [0.0, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0] {
        let request = OptimizationRequest::new(assets.clone(), lambda, as_of())
            .with_penalties(PenaltyConfig::none());
        let report = optimize_portfolio(&request, &history);
        assert!(report.success, "{}", report.message);

        let risk = report.optimized_performance.unwrap().risk;
        assert!(risk <= previous + 1e-6, "risk rose to {risk} at λ = {lambda}");
        previous = risk;
    }
}

#[test]
fn test_breakdown_matches_objective() {
    let (assets, history) = eight_asset_case();
    let request = OptimizationRequest::new(assets, 0.5, as_of());

    let report = optimize_portfolio(&request, &history);

    let breakdown = report.breakdown.unwrap();
    assert_relative_eq!(
        breakdown.total,
        report.objective_value.unwrap(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        breakdown.total,
        -breakdown.expected_return
            + breakdown.risk_penalty
            + breakdown.tax_penalty.unwrap_or(0.0)
            + breakdown.esg_penalty.unwrap_or(0.0),
        epsilon = 1e-12
    );
}

#[test]
fn test_prepared_problem_solves_many_tolerances() {
    let (assets, history) = eight_asset_case();
    let request = OptimizationRequest::new(assets, 0.0, as_of());
    let problem = PreparedProblem::prepare(&request, &history).unwrap();
    let optimizer = ConstrainedOptimizer::new(request.optimizer.clone());

    let (composer, allocation) = problem.solve(0.5, &optimizer).unwrap();

    assert!(allocation.success);
    assert_eq!(composer.risk_tolerance(), 0.5);
    assert!(composer
        .penalties()
        .iter()
        .any(|(term, _)| *term == PenaltyTerm::TaxCost));
}

#[test]
fn test_frontier_and_target_risk() {
    let (assets, history) = eight_asset_case();
    let request = OptimizationRequest::new(assets, 0.0, as_of())
        .with_penalties(PenaltyConfig::none());
    let problem = PreparedProblem::prepare(&request, &history).unwrap();
    let optimizer = ConstrainedOptimizer::new(request.optimizer.clone());

    let grid = risk_tolerance_grid(0.0, 4.0, 5).unwrap();
    let points = trace_frontier(&problem, &optimizer, &grid).unwrap();
    assert_eq!(points.len(), 5);

    let target = 0.5 * (points[0].risk + points[4].risk);
    let point = tolerance_for_target_risk(&problem, &optimizer, target, 0.0, 4.0).unwrap();
    assert_relative_eq!(point.risk, target, epsilon = 1e-5);
    assert!(point.risk_tolerance > 0.0 && point.risk_tolerance < 4.0);
}

// =============================================================================
// PERFORMANCE EVALUATION
// =============================================================================

#[test]
fn test_evaluate_two_asset_fixture() {
    // Returns: A +10%, -10%, +10%; B +5%, 0%, +5%
    let history = PriceHistory::new()
        .with("A", vec![100.0, 110.0, 99.0, 108.9])
        .with("B", vec![50.0, 52.5, 52.5, 55.125]);
    let stats = estimate(&history).unwrap();

    assert_relative_eq!(stats.covariance[(0, 0)], 1.0 / 75.0, epsilon = 1e-12);
    assert_relative_eq!(stats.covariance[(1, 1)], 1.0 / 1200.0, epsilon = 1e-12);
    assert_relative_eq!(stats.covariance[(0, 1)], 1.0 / 300.0, epsilon = 1e-12);

    let w = DVector::from_vec(vec![0.5, 0.5]);
    let metrics = evaluate(&w, &stats.expected_returns, &stats.covariance).unwrap();

    assert_relative_eq!(metrics.expected_return, 1.0 / 30.0, epsilon = 1e-12);
    assert_relative_eq!(metrics.risk, (1.0_f64 / 192.0).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_single_return_per_asset_is_insufficient() {
    let history = PriceHistory::new()
        .with("A", vec![100.0, 101.0])
        .with("B", vec![50.0, 49.0]);

    let err = estimate(&history).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let request = OptimizationRequest::new(
        vec![
            Asset::new("A", 10, 101.0, bought()).unwrap(),
            Asset::new("B", 10, 49.0, bought()).unwrap(),
        ],
        0.5,
        as_of(),
    )
    .with_penalties(PenaltyConfig::none())
    .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0));

    let report = optimize_portfolio(&request, &history);

    assert!(!report.success);
    assert_eq!(report.error_kind, Some(ErrorKind::InsufficientData));
    assert!(report.weights.is_empty());
}

#[test]
fn test_current_performance_by_basis() {
    let request = OptimizationRequest::new(three_assets(), 0.1, as_of())
        .with_optimizer(OptimizerConfig::new().with_bounds(0.0, 1.0));
    let problem = PreparedProblem::prepare(&request, &three_asset_history()).unwrap();

    let by_shares = problem.current_performance(WeightBasis::Shares).unwrap();
    let equal = problem.current_performance(WeightBasis::Equal).unwrap();

    // Shares 10/20/5 overweight BBB relative to equal weighting
    assert!((by_shares.expected_return - equal.expected_return).abs() > 1e-9);
}
