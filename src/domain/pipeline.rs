//! End-to-end optimization of one request.
//!
//! validate -> covariance -> primary solve -> frontier sweep -> floor + reconcile.
//! Everything is request-scoped; identical inputs give identical results.

use super::asset::{validate_assets, validate_target_return, Asset, AssetRecord};
use super::covariance::build_covariance;
use super::error::{PortoptError, Warning};
use super::frontier::{generate_frontier, FrontierConfig, FrontierPoint};
use super::normalize::floor_then_normalize;
use super::optimizer::{optimize_for_target, OptimizerConfig};
use super::reconcile::{reconcile_share_counts, ReconcileConfig, Reconciliation};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    pub optimizer: OptimizerConfig,
    pub frontier: FrontierConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetWeight {
    pub name: String,
    pub weight: f64,
}

/// An input asset paired with its reconciled share count.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedHolding {
    pub asset: Asset,
    pub active_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub target_return: f64,
    pub initial_weights: Vec<AssetWeight>,
    pub optimized_weights: Vec<AssetWeight>,
    pub portfolio_value: f64,
    pub final_return: f64,
    pub final_risk: f64,
    pub frontier: Vec<FrontierPoint>,
    pub adjusted_share_counts: Vec<AdjustedHolding>,
    pub reconciliation: Reconciliation,
    pub warnings: Vec<Warning>,
}

pub fn optimize_portfolio(
    records: &[AssetRecord],
    target_return: f64,
    config: &PipelineConfig,
) -> Result<OptimizationResult, PortoptError> {
    let portfolio = validate_assets(records)?;
    let target_return = validate_target_return(target_return)?;

    let (covariance, mut warnings) = build_covariance(&portfolio);
    let mu = portfolio.expected_returns();
    let portfolio_value = portfolio.current_value();
    let initial = portfolio.value_weights();

    let solution =
        optimize_for_target(&covariance, &mu, target_return, &initial, &config.optimizer)?;
    warnings.extend(solution.warnings.iter().cloned());

    let frontier = generate_frontier(&covariance, &mu, &config.optimizer, &config.frontier)?;
    warnings.extend(frontier.warnings);

    let discrete = floor_then_normalize(&solution.weights, config.reconcile.min_weight);
    let reconciliation = reconcile_share_counts(
        &discrete,
        &portfolio.prices(),
        portfolio_value,
        config.reconcile.residue_tolerance,
    );

    let initial_weights = named_weights(&portfolio.assets, &initial);
    let optimized_weights = named_weights(&portfolio.assets, &solution.weights);
    let adjusted_share_counts = portfolio
        .assets
        .into_iter()
        .zip(&reconciliation.counts)
        .map(|(asset, &active_count)| AdjustedHolding {
            asset,
            active_count,
        })
        .collect();

    Ok(OptimizationResult {
        target_return,
        initial_weights,
        optimized_weights,
        portfolio_value,
        final_return: solution.achieved_return,
        final_risk: solution.risk,
        frontier: frontier.points,
        adjusted_share_counts,
        reconciliation,
        warnings,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontierResult {
    pub points: Vec<FrontierPoint>,
    pub warnings: Vec<Warning>,
}

/// Validate and sweep the frontier without a target or reconciliation.
pub fn efficient_frontier(
    records: &[AssetRecord],
    config: &PipelineConfig,
) -> Result<FrontierResult, PortoptError> {
    let portfolio = validate_assets(records)?;
    let (covariance, mut warnings) = build_covariance(&portfolio);
    let frontier = generate_frontier(
        &covariance,
        &portfolio.expected_returns(),
        &config.optimizer,
        &config.frontier,
    )?;
    warnings.extend(frontier.warnings);
    Ok(FrontierResult {
        points: frontier.points,
        warnings,
    })
}

fn named_weights(assets: &[Asset], weights: &[f64]) -> Vec<AssetWeight> {
    assets
        .iter()
        .zip(weights)
        .map(|(a, &weight)| AssetWeight {
            name: a.name.clone(),
            weight,
        })
        .collect()
}
