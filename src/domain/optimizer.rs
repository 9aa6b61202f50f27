//! Penalty-method portfolio optimizer.
//!
//! Minimizes
//!
//! ```text
//! f(w) = w' Sigma w + C1 * (sum(w) - 1)^2 + C2 * (mu' w - r)^2
//! ```
//!
//! with an unconstrained `argmin` solver, then renormalizes the result. The
//! penalties make constraint violation dominate variance away from the
//! feasible set but do not enforce it exactly, so the achieved return is
//! checked against a tolerance and reported as a warning when it drifts.

use std::fmt;
use std::str::FromStr;

use argmin::core::{CostFunction, Error, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::quasinewton::LBFGS;

use super::covariance::CovarianceMatrix;
use super::error::{PortoptError, Warning};
use super::normalize::{is_degenerate, normalize, uniform};

pub const DEFAULT_SUM_PENALTY: f64 = 1e6;
pub const DEFAULT_RETURN_PENALTY: f64 = 1e7;
pub const DEFAULT_MAX_ITERS: u64 = 1000;
pub const DEFAULT_RETURN_TOLERANCE: f64 = 0.01;

/// History size for L-BFGS.
const LBFGS_MEMORY: usize = 7;
/// Offset applied per coordinate when building the initial Nelder-Mead simplex.
const SIMPLEX_STEP: f64 = 0.05;
const SIMPLEX_SD_TOLERANCE: f64 = 1e-14;

pub type Weights = Vec<f64>;
type MoreThuente = MoreThuenteLineSearch<Weights, Weights, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverMethod {
    /// L-BFGS with More-Thuente line search on the analytic gradient.
    Lbfgs,
    /// Derivative-free simplex search.
    NelderMead,
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverMethod::Lbfgs => write!(f, "lbfgs"),
            SolverMethod::NelderMead => write!(f, "nelder-mead"),
        }
    }
}

impl FromStr for SolverMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lbfgs" | "l-bfgs" => Ok(SolverMethod::Lbfgs),
            "nelder-mead" | "nelder_mead" | "neldermead" => Ok(SolverMethod::NelderMead),
            other => Err(format!(
                "unknown solver method '{other}' (expected lbfgs or nelder-mead)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyCoefficients {
    /// C1, weight of (sum(w) - 1)^2.
    pub sum: f64,
    /// C2, weight of (mu' w - r)^2.
    pub target_return: f64,
}

impl Default for PenaltyCoefficients {
    fn default() -> Self {
        PenaltyCoefficients {
            sum: DEFAULT_SUM_PENALTY,
            target_return: DEFAULT_RETURN_PENALTY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    pub method: SolverMethod,
    pub penalties: PenaltyCoefficients,
    pub max_iters: u64,
    pub return_tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            method: SolverMethod::Lbfgs,
            penalties: PenaltyCoefficients::default(),
            max_iters: DEFAULT_MAX_ITERS,
            return_tolerance: DEFAULT_RETURN_TOLERANCE,
        }
    }
}

/// Scalar objective handed to the solver. Borrows the request's read-only inputs.
pub struct PenaltyObjective<'a> {
    covariance: &'a CovarianceMatrix,
    expected_returns: &'a [f64],
    target: f64,
    penalties: PenaltyCoefficients,
}

impl<'a> PenaltyObjective<'a> {
    pub fn new(
        covariance: &'a CovarianceMatrix,
        expected_returns: &'a [f64],
        target: f64,
        penalties: PenaltyCoefficients,
    ) -> Self {
        PenaltyObjective {
            covariance,
            expected_returns,
            target,
            penalties,
        }
    }

    fn sum_violation(&self, w: &[f64]) -> f64 {
        w.iter().sum::<f64>() - 1.0
    }

    fn return_violation(&self, w: &[f64]) -> f64 {
        portfolio_return(self.expected_returns, w) - self.target
    }

    pub fn value(&self, w: &[f64]) -> f64 {
        let s = self.sum_violation(w);
        let r = self.return_violation(w);
        self.covariance.variance(w)
            + self.penalties.sum * s * s
            + self.penalties.target_return * r * r
    }

    /// 2 Sigma w + 2 C1 (sum(w) - 1) 1 + 2 C2 (mu' w - r) mu
    pub fn gradient_at(&self, w: &[f64]) -> Vec<f64> {
        let s = 2.0 * self.penalties.sum * self.sum_violation(w);
        let r = 2.0 * self.penalties.target_return * self.return_violation(w);
        self.covariance
            .mul_vec(w)
            .iter()
            .zip(self.expected_returns)
            .map(|(sw, mu)| 2.0 * sw + s + r * mu)
            .collect()
    }
}

impl CostFunction for PenaltyObjective<'_> {
    type Param = Weights;
    type Output = f64;

    fn cost(&self, w: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.value(w))
    }
}

impl Gradient for PenaltyObjective<'_> {
    type Param = Weights;
    type Gradient = Weights;

    fn gradient(&self, w: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.gradient_at(w))
    }
}

/// Outcome of one optimization at a fixed target return.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSolution {
    pub target_return: f64,
    /// Normalized weights, aligned with the asset list.
    pub weights: Vec<f64>,
    pub achieved_return: f64,
    pub risk: f64,
    /// The solver's weights summed to ~0 and uniform weights were substituted.
    pub degenerate: bool,
    pub warnings: Vec<Warning>,
}

pub fn portfolio_return(expected_returns: &[f64], w: &[f64]) -> f64 {
    expected_returns.iter().zip(w).map(|(m, x)| m * x).sum()
}

/// Solve for the minimum-variance weights achieving `target`.
pub fn optimize_for_target(
    covariance: &CovarianceMatrix,
    expected_returns: &[f64],
    target: f64,
    initial: &[f64],
    config: &OptimizerConfig,
) -> Result<TargetSolution, PortoptError> {
    let n = covariance.dim();
    if expected_returns.len() != n || initial.len() != n {
        return Err(PortoptError::invalid(format!(
            "dimension mismatch: covariance {n}x{n}, {} expected returns, {} initial weights",
            expected_returns.len(),
            initial.len()
        )));
    }

    let objective = PenaltyObjective::new(covariance, expected_returns, target, config.penalties);
    let raw = match config.method {
        SolverMethod::Lbfgs => minimize_lbfgs(objective, initial.to_vec(), config.max_iters)?,
        SolverMethod::NelderMead => {
            minimize_nelder_mead(objective, initial.to_vec(), config.max_iters)?
        }
    };

    if raw.iter().any(|w| !w.is_finite()) {
        return Err(PortoptError::Computation {
            reason: format!("solver produced non-finite weights for target {target}"),
        });
    }

    Ok(finish_solution(
        covariance,
        expected_returns,
        target,
        &raw,
        config.return_tolerance,
    ))
}

/// Normalize raw solver weights, falling back to uniform when they sum to ~0,
/// and flag a return that misses `target` by more than `return_tolerance`.
pub(crate) fn finish_solution(
    covariance: &CovarianceMatrix,
    expected_returns: &[f64],
    target: f64,
    raw: &[f64],
    return_tolerance: f64,
) -> TargetSolution {
    let mut warnings = Vec::new();
    let degenerate = is_degenerate(raw);
    let weights = if degenerate {
        warnings.push(Warning::DegenerateWeights { target });
        uniform(raw.len())
    } else {
        normalize(raw)
    };

    let achieved_return = portfolio_return(expected_returns, &weights);
    if (achieved_return - target).abs() > return_tolerance {
        warnings.push(Warning::ReturnDeviation {
            target,
            achieved: achieved_return,
        });
    }

    TargetSolution {
        target_return: target,
        risk: covariance.risk(&weights),
        weights,
        achieved_return,
        degenerate,
        warnings,
    }
}

fn minimize_lbfgs(
    objective: PenaltyObjective<'_>,
    initial: Weights,
    max_iters: u64,
) -> Result<Weights, PortoptError> {
    let solver: LBFGS<MoreThuente, Weights, Weights, f64> =
        LBFGS::new(MoreThuenteLineSearch::new(), LBFGS_MEMORY);
    let result = Executor::new(objective, solver)
        .configure(|state| state.param(initial).max_iters(max_iters))
        .run()
        .map_err(solver_error)?;
    best_param(result.state().get_best_param())
}

fn minimize_nelder_mead(
    objective: PenaltyObjective<'_>,
    initial: Weights,
    max_iters: u64,
) -> Result<Weights, PortoptError> {
    let solver = NelderMead::new(initial_simplex(&initial))
        .with_sd_tolerance(SIMPLEX_SD_TOLERANCE)
        .map_err(solver_error)?;
    let result = Executor::new(objective, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(solver_error)?;
    best_param(result.state().get_best_param())
}

/// The initial point plus one vertex per coordinate offset by `SIMPLEX_STEP`.
fn initial_simplex(initial: &[f64]) -> Vec<Weights> {
    let mut simplex = Vec::with_capacity(initial.len() + 1);
    simplex.push(initial.to_vec());
    for i in 0..initial.len() {
        let mut vertex = initial.to_vec();
        vertex[i] += SIMPLEX_STEP;
        simplex.push(vertex);
    }
    simplex
}

fn best_param(param: Option<&Weights>) -> Result<Weights, PortoptError> {
    param.cloned().ok_or_else(|| PortoptError::Computation {
        reason: "solver finished without a best parameter".into(),
    })
}

fn solver_error(err: Error) -> PortoptError {
    PortoptError::Computation {
        reason: err.to_string(),
    }
}
