//! End-to-end properties of the optimization pipeline.
//!
//! Tests cover:
//! - Two-asset midpoint scenario with uncorrelated assets
//! - Validation failures before any matrix is built
//! - Frontier size and sweep ordering
//! - Share-count reconciliation against portfolio value
//! - Idempotence across repeated calls

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use portopt::domain::asset::validate_assets;
use portopt::domain::covariance::build_covariance;
use portopt::domain::error::{PortoptError, Warning};
use portopt::domain::optimizer::{OptimizerConfig, SolverMethod};
use portopt::domain::pipeline::{efficient_frontier, optimize_portfolio, PipelineConfig};

mod two_asset_scenario {
    use super::*;

    #[test]
    fn midpoint_target_is_reached() {
        let result =
            optimize_portfolio(&two_asset_records(), 0.0015, &sequential_config(10)).unwrap();

        let sum: f64 = result.optimized_weights.iter().map(|w| w.weight).sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        assert!((result.final_return - 0.0015).abs() <= 0.01);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn weights_tilt_toward_midpoint_mix() {
        let result =
            optimize_portfolio(&two_asset_records(), 0.0015, &sequential_config(10)).unwrap();
        // Return constraint pins w = [0.5, 0.5] for mu = [0.001, 0.002].
        assert_abs_diff_eq!(result.optimized_weights[0].weight, 0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(result.optimized_weights[1].weight, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn nelder_mead_also_reaches_target() {
        let config = PipelineConfig {
            optimizer: OptimizerConfig {
                method: SolverMethod::NelderMead,
                ..OptimizerConfig::default()
            },
            ..sequential_config(4)
        };
        let result = optimize_portfolio(&two_asset_records(), 0.0015, &config).unwrap();
        let sum: f64 = result.optimized_weights.iter().map(|w| w.weight).sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        assert!((result.final_return - 0.0015).abs() <= 0.01);
    }

    #[test]
    fn initial_weights_follow_market_value() {
        let result =
            optimize_portfolio(&two_asset_records(), 0.0015, &sequential_config(4)).unwrap();
        // 600 in BOND and 400 in EQUITY
        assert_abs_diff_eq!(result.portfolio_value, 1000.0);
        assert_abs_diff_eq!(result.initial_weights[0].weight, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(result.initial_weights[1].weight, 0.4, epsilon = 1e-12);
    }
}

mod validation {
    use super::*;

    #[test]
    fn single_asset_is_rejected() {
        let records = vec![two_asset_records().remove(0)];
        let err = optimize_portfolio(&records, 0.0015, &sequential_config(4)).unwrap_err();
        assert!(matches!(err, PortoptError::InputValidation { .. }));
    }

    #[test]
    fn missing_volatility_is_rejected() {
        let mut records = two_asset_records();
        records[1].volatility = None;
        let err = optimize_portfolio(&records, 0.0015, &sequential_config(4)).unwrap_err();
        assert!(matches!(err, PortoptError::InputValidation { .. }));
        assert!(err.to_string().contains("volatility"));
    }

    #[test]
    fn unequal_series_are_rejected() {
        let mut records = two_asset_records();
        records[0].daily_returns = Some(vec![0.01, 0.02, 0.03]);
        assert!(validate_assets(&records).is_err());
    }

    #[test]
    fn frontier_rejects_single_asset() {
        let records = vec![two_asset_records().remove(1)];
        assert!(efficient_frontier(&records, &sequential_config(4)).is_err());
    }
}

mod covariance_properties {
    use super::*;

    #[test]
    fn diagonal_is_squared_volatility() {
        let portfolio = validate_assets(&three_asset_records()).unwrap();
        let (cov, warnings) = build_covariance(&portfolio);
        assert!(warnings.is_empty());
        for (i, asset) in portfolio.assets.iter().enumerate() {
            let variance = asset.volatility * asset.volatility;
            assert_abs_diff_eq!(cov.get(i, i), variance, epsilon = 1e-15);
        }
    }

    #[test]
    fn constant_series_produces_warning() {
        let mut records = three_asset_records();
        records[2].daily_returns = Some(vec![0.25; 6]);
        let result = optimize_portfolio(&records, 0.0015, &sequential_config(4)).unwrap();
        let flagged = result
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::DegenerateSeries { .. }))
            .count();
        assert_eq!(flagged, 2);
    }
}

mod frontier_sweep {
    use super::*;

    #[test]
    fn returns_n_plus_one_points() {
        for n in [1, 5, 20] {
            let frontier =
                efficient_frontier(&three_asset_records(), &sequential_config(n)).unwrap();
            assert_eq!(frontier.points.len(), n + 1);
        }
    }

    #[test]
    fn targets_are_non_decreasing_and_span_mu() {
        let frontier = efficient_frontier(&three_asset_records(), &sequential_config(8)).unwrap();
        for pair in frontier.points.windows(2) {
            assert!(pair[1].target_return >= pair[0].target_return);
        }
        assert_abs_diff_eq!(frontier.points[0].target_return, 0.0008, epsilon = 1e-15);
        assert_abs_diff_eq!(frontier.points[8].target_return, 0.0022, epsilon = 1e-15);
    }

    #[test]
    fn risk_is_finite_and_non_negative() {
        let frontier = efficient_frontier(&three_asset_records(), &sequential_config(8)).unwrap();
        assert!(frontier.points.iter().all(|p| p.risk.is_finite() && p.risk >= 0.0));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let sequential =
            efficient_frontier(&three_asset_records(), &sequential_config(12)).unwrap();
        let mut config = sequential_config(12);
        config.frontier.parallel = true;
        let parallel = efficient_frontier(&three_asset_records(), &config).unwrap();
        assert_eq!(sequential, parallel);
    }
}

mod reconciliation {
    use super::*;

    #[test]
    fn allocated_value_within_cheapest_price() {
        let mut records = three_asset_records();
        for r in &mut records {
            r.share_count = r.share_count.map(|c| c * 100);
        }
        let result = optimize_portfolio(&records, 0.0015, &sequential_config(4)).unwrap();
        let allocated: f64 = result
            .adjusted_share_counts
            .iter()
            .map(|h| h.active_count as f64 * h.asset.price)
            .sum();
        assert_abs_diff_eq!(allocated, result.reconciliation.allocated_value, epsilon = 1e-9);
        assert!((result.portfolio_value - allocated).abs() < 12.5);
    }

    #[test]
    fn holdings_keep_input_order() {
        let result =
            optimize_portfolio(&three_asset_records(), 0.0015, &sequential_config(4)).unwrap();
        let names: Vec<&str> = result
            .adjusted_share_counts
            .iter()
            .map(|h| h.asset.name.as_str())
            .collect();
        assert_eq!(names, vec!["AAA", "BBB", "CCC"]);
    }
}

mod idempotence {
    use super::*;

    #[test]
    fn repeated_calls_are_identical() {
        let records = three_asset_records();
        let config = sequential_config(6);
        let first = optimize_portfolio(&records, 0.0015, &config).unwrap();
        let second = optimize_portfolio(&records, 0.0015, &config).unwrap();
        assert_eq!(first.optimized_weights, second.optimized_weights);
        assert_eq!(first.reconciliation.counts, second.reconciliation.counts);
        assert_eq!(first, second);
    }
}
