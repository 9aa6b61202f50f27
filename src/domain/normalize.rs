//! Weight normalization onto the unit simplex.
//!
//! Plain normalization is used for displayed weights. Floor-then-normalize is
//! applied only before discretizing weights into share counts, so that assets
//! with near-zero optimized weight keep a small allocation.

pub const DEFAULT_MIN_WEIGHT: f64 = 0.01;

/// |sum(w)| at or below this fraction of sum(|w|) counts as a zero sum.
const DEGENERATE_SUM_TOLERANCE: f64 = 1e-8;

pub fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// True when the weights cannot be scaled to sum to one.
pub fn is_degenerate(weights: &[f64]) -> bool {
    let sum: f64 = weights.iter().sum();
    let scale = weights.iter().map(|w| w.abs()).sum::<f64>().max(1.0);
    !sum.is_finite() || sum.abs() <= DEGENERATE_SUM_TOLERANCE * scale
}

/// w / sum(w), or uniform 1/N when the sum is zero. Never fails.
pub fn normalize(weights: &[f64]) -> Vec<f64> {
    if is_degenerate(weights) {
        return uniform(weights.len());
    }
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| w / sum).collect()
}

/// Clamp each weight to at least `min_weight`, then normalize.
pub fn floor_then_normalize(weights: &[f64], min_weight: f64) -> Vec<f64> {
    let floored: Vec<f64> = weights.iter().map(|w| w.max(min_weight)).collect();
    normalize(&floored)
}
