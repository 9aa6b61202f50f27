//! Configuration loading and validation.
//!
//! Every key is optional; missing keys take the defaults of the domain
//! config structs. Present keys are range-checked before any computation.

use crate::domain::error::PortoptError;
use crate::domain::frontier::{FrontierConfig, MAX_NUM_POINTS};
use crate::domain::optimizer::{OptimizerConfig, PenaltyCoefficients, SolverMethod};
use crate::domain::pipeline::PipelineConfig;
use crate::domain::reconcile::ReconcileConfig;
use crate::ports::config_port::ConfigPort;

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, PortoptError> {
    Ok(PipelineConfig {
        optimizer: build_optimizer_config(config)?,
        frontier: build_frontier_config(config)?,
        reconcile: build_reconcile_config(config)?,
    })
}

pub fn build_optimizer_config(config: &dyn ConfigPort) -> Result<OptimizerConfig, PortoptError> {
    let defaults = OptimizerConfig::default();

    let method = match config.get_string("optimizer", "method") {
        Some(s) if !s.trim().is_empty() => {
            s.parse::<SolverMethod>()
                .map_err(|reason| PortoptError::ConfigInvalid {
                    section: "optimizer".to_string(),
                    key: "method".to_string(),
                    reason,
                })?
        }
        _ => defaults.method,
    };

    let sum = positive(config, "optimizer", "sum_penalty", defaults.penalties.sum)?;
    let target_return = positive(
        config,
        "optimizer",
        "return_penalty",
        defaults.penalties.target_return,
    )?;
    let return_tolerance = positive(
        config,
        "optimizer",
        "return_tolerance",
        defaults.return_tolerance,
    )?;

    let max_iters = config
        .get_int("optimizer", "max_iters")?
        .unwrap_or(defaults.max_iters as i64);
    if max_iters < 1 {
        return Err(PortoptError::ConfigInvalid {
            section: "optimizer".to_string(),
            key: "max_iters".to_string(),
            reason: "max_iters must be at least 1".to_string(),
        });
    }

    Ok(OptimizerConfig {
        method,
        penalties: PenaltyCoefficients { sum, target_return },
        max_iters: max_iters as u64,
        return_tolerance,
    })
}

pub fn build_frontier_config(config: &dyn ConfigPort) -> Result<FrontierConfig, PortoptError> {
    let defaults = FrontierConfig::default();
    let num_points = config
        .get_int("frontier", "num_points")?
        .unwrap_or(defaults.num_points as i64);
    if num_points < 1 || num_points > MAX_NUM_POINTS as i64 {
        return Err(PortoptError::ConfigInvalid {
            section: "frontier".to_string(),
            key: "num_points".to_string(),
            reason: format!("num_points must be between 1 and {MAX_NUM_POINTS}"),
        });
    }
    Ok(FrontierConfig {
        num_points: num_points as usize,
        parallel: config
            .get_bool("frontier", "parallel")?
            .unwrap_or(defaults.parallel),
    })
}

pub fn build_reconcile_config(config: &dyn ConfigPort) -> Result<ReconcileConfig, PortoptError> {
    let defaults = ReconcileConfig::default();
    let min_weight = config
        .get_double("reconcile", "min_weight")?
        .unwrap_or(defaults.min_weight);
    if !(0.0..1.0).contains(&min_weight) {
        return Err(PortoptError::ConfigInvalid {
            section: "reconcile".to_string(),
            key: "min_weight".to_string(),
            reason: "min_weight must be in [0, 1)".to_string(),
        });
    }
    Ok(ReconcileConfig {
        min_weight,
        residue_tolerance: positive(
            config,
            "reconcile",
            "residue_tolerance",
            defaults.residue_tolerance,
        )?,
    })
}

fn positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PortoptError> {
    let value = config.get_double(section, key)?.unwrap_or(default);
    if !value.is_finite() || value <= 0.0 {
        return Err(PortoptError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(value)
}
