//! Efficient frontier sweep.
//!
//! Target returns run linearly from min(mu) to max(mu) in `num_points + 1`
//! steps. Each step is an independent optimization from the uniform
//! allocation, so steps may run on the rayon pool and are joined in sweep
//! order. Risk along the sweep is not guaranteed to be monotonic.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::covariance::CovarianceMatrix;
use super::error::{PortoptError, Warning};
use super::normalize::uniform;
use super::optimizer::{optimize_for_target, OptimizerConfig, TargetSolution};

pub const DEFAULT_NUM_POINTS: usize = 50;
pub const MAX_NUM_POINTS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierConfig {
    pub num_points: usize,
    pub parallel: bool,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        FrontierConfig {
            num_points: DEFAULT_NUM_POINTS,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrontierPoint {
    /// Target return of this sweep step.
    pub target_return: f64,
    /// Return of the normalized weights actually found.
    pub expected_return: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frontier {
    pub points: Vec<FrontierPoint>,
    pub warnings: Vec<Warning>,
}

/// Target returns of the sweep, `num_points + 1` values from min(mu) to max(mu).
pub fn sweep_targets(expected_returns: &[f64], num_points: usize) -> Vec<f64> {
    let lo = expected_returns
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let hi = expected_returns
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let step = (hi - lo) / num_points as f64;
    (0..=num_points)
        .map(|i| if i == num_points { hi } else { lo + step * i as f64 })
        .collect()
}

pub fn generate_frontier(
    covariance: &CovarianceMatrix,
    expected_returns: &[f64],
    optimizer: &OptimizerConfig,
    config: &FrontierConfig,
) -> Result<Frontier, PortoptError> {
    if config.num_points == 0 || config.num_points > MAX_NUM_POINTS {
        return Err(PortoptError::invalid(format!(
            "frontier point count must be between 1 and {MAX_NUM_POINTS}, got {}",
            config.num_points
        )));
    }
    if expected_returns.is_empty() {
        return Err(PortoptError::invalid("frontier needs at least one asset"));
    }

    let targets = sweep_targets(expected_returns, config.num_points);
    let initial = uniform(expected_returns.len());
    let solve = |target: &f64| {
        optimize_for_target(covariance, expected_returns, *target, &initial, optimizer)
    };

    let solutions: Vec<TargetSolution> = if config.parallel {
        solve_all_parallel(&targets, solve)?
    } else {
        targets.iter().map(solve).collect::<Result<_, _>>()?
    };

    Ok(assemble_frontier(solutions))
}

/// Collect per-target solutions into points, keeping sweep order.
///
/// Per-point warnings are passed through. When every point fell back to
/// uniform weights they are replaced by a single `DegenerateFrontier`.
fn assemble_frontier(solutions: Vec<TargetSolution>) -> Frontier {
    let all_degenerate = !solutions.is_empty() && solutions.iter().all(|s| s.degenerate);
    let mut warnings = Vec::new();
    if all_degenerate {
        warnings.push(Warning::DegenerateFrontier {
            points: solutions.len(),
        });
    }

    let mut points = Vec::with_capacity(solutions.len());
    for s in solutions {
        warnings.extend(
            s.warnings
                .into_iter()
                .filter(|w| !(all_degenerate && matches!(w, Warning::DegenerateWeights { .. }))),
        );
        points.push(FrontierPoint {
            target_return: s.target_return,
            expected_return: s.achieved_return,
            risk: s.risk,
        });
    }

    Frontier { points, warnings }
}

#[cfg(feature = "parallel")]
fn solve_all_parallel<F>(targets: &[f64], solve: F) -> Result<Vec<TargetSolution>, PortoptError>
where
    F: Fn(&f64) -> Result<TargetSolution, PortoptError> + Sync + Send,
{
    targets.par_iter().map(solve).collect()
}

#[cfg(not(feature = "parallel"))]
fn solve_all_parallel<F>(targets: &[f64], solve: F) -> Result<Vec<TargetSolution>, PortoptError>
where
    F: Fn(&f64) -> Result<TargetSolution, PortoptError>,
{
    targets.iter().map(solve).collect()
}
