//! Pearson correlation of two daily-return series.
//!
//! corr(a, b) = sum((a_i - mean_a)(b_i - mean_b))
//!             / sqrt(sum((a_i - mean_a)^2) * sum((b_i - mean_b)^2))

use super::error::PortoptError;

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn pearson(a: &[f64], b: &[f64]) -> Result<f64, PortoptError> {
    if a.len() != b.len() {
        return Err(PortoptError::DegenerateInput {
            reason: format!("series lengths differ ({} vs {})", a.len(), b.len()),
        });
    }
    if a.is_empty() {
        return Err(PortoptError::DegenerateInput {
            reason: "empty series".into(),
        });
    }

    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cross = 0.0;
    let mut sq_a = 0.0;
    let mut sq_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        sq_a += dx * dx;
        sq_b += dy * dy;
    }

    let denominator = (sq_a * sq_b).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(PortoptError::DegenerateInput {
            reason: "zero-variance series has no defined correlation".into(),
        });
    }

    Ok((cross / denominator).clamp(-1.0, 1.0))
}
