//! Discretize weights into whole share counts while preserving portfolio value.
//!
//! Counts are rounded to nearest, then the leftover value (residue) is walked
//! off greedily: assets are ranked by |residue / price| (cheapest first) and
//! each absorbs whole shares while the residue is at least its price. The
//! walk is bounded by ceil(|residue| / min(price)) adjustments.

use super::normalize::DEFAULT_MIN_WEIGHT;

pub const DEFAULT_RESIDUE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileConfig {
    /// Floor applied to each weight before discretization.
    pub min_weight: f64,
    /// Residue below this is considered settled.
    pub residue_tolerance: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            min_weight: DEFAULT_MIN_WEIGHT,
            residue_tolerance: DEFAULT_RESIDUE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub counts: Vec<u64>,
    /// sum(count * price) after adjustment.
    pub allocated_value: f64,
    /// portfolio_value - allocated_value.
    pub residue: f64,
    /// Number of single-share adjustments made after rounding.
    pub adjustments: usize,
}

/// Convert normalized weights into share counts worth roughly `portfolio_value`.
///
/// `weights` and `prices` are aligned; prices must be positive.
pub fn reconcile_share_counts(
    weights: &[f64],
    prices: &[f64],
    portfolio_value: f64,
    residue_tolerance: f64,
) -> Reconciliation {
    let mut counts: Vec<i64> = weights
        .iter()
        .zip(prices)
        .map(|(w, p)| {
            let raw = w * portfolio_value / p;
            if raw.is_finite() { raw.round().max(0.0) as i64 } else { 0 }
        })
        .collect();

    let mut residue = portfolio_value - value_of(&counts, prices);
    let mut adjustments = 0usize;

    if residue.abs() > residue_tolerance {
        let mut ranking: Vec<(usize, f64)> = prices
            .iter()
            .enumerate()
            .map(|(idx, p)| (idx, (residue / p).abs()))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

        'walk: for (idx, _) in ranking {
            let price = prices[idx];
            while residue.abs() >= price {
                let step: i64 = if residue > 0.0 { 1 } else { -1 };
                if step < 0 && counts[idx] == 0 {
                    break;
                }
                counts[idx] += step;
                residue -= step as f64 * price;
                adjustments += 1;
                if residue.abs() < residue_tolerance {
                    break 'walk;
                }
            }
        }
    }

    let counts: Vec<u64> = counts.into_iter().map(|c| c.max(0) as u64).collect();
    let allocated_value = counts
        .iter()
        .zip(prices)
        .map(|(&c, p)| c as f64 * p)
        .sum::<f64>();

    Reconciliation {
        residue: portfolio_value - allocated_value,
        counts,
        allocated_value,
        adjustments,
    }
}

fn value_of(counts: &[i64], prices: &[f64]) -> f64 {
    counts.iter().zip(prices).map(|(&c, p)| c as f64 * p).sum()
}
