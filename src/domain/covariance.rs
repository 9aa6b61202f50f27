//! Covariance matrix from pairwise correlation and per-asset volatility.
//!
//! cov[i][i] = vol[i]^2
//! cov[i][j] = corr(i, j) * vol[i] * vol[j]

use super::asset::Portfolio;
use super::correlation::pearson;
use super::error::{PortoptError, Warning};

/// Dense symmetric N x N matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl CovarianceMatrix {
    /// Build from explicit rows. Rows must form a square matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, PortoptError> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return Err(PortoptError::invalid("covariance rows must form a square matrix"));
        }
        Ok(CovarianceMatrix {
            n,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    /// Sigma * w
    pub fn mul_vec(&self, w: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| self.row(i).iter().zip(w).map(|(c, x)| c * x).sum())
            .collect()
    }

    /// Portfolio variance w' Sigma w.
    pub fn variance(&self, w: &[f64]) -> f64 {
        self.mul_vec(w).iter().zip(w).map(|(s, x)| s * x).sum()
    }

    /// Portfolio standard deviation, with tiny negative round-off clamped to zero.
    pub fn risk(&self, w: &[f64]) -> f64 {
        self.variance(w).max(0.0).sqrt()
    }
}

/// Build the covariance matrix for a validated portfolio.
///
/// Pairs whose correlation is undefined (a constant return series) are treated
/// as uncorrelated and reported as [`Warning::DegenerateSeries`].
pub fn build_covariance(portfolio: &Portfolio) -> (CovarianceMatrix, Vec<Warning>) {
    let n = portfolio.len();
    let mut values = vec![0.0; n * n];
    let mut warnings = Vec::new();

    for i in 0..n {
        let a = &portfolio.assets[i];
        values[i * n + i] = a.volatility * a.volatility;

        for j in (i + 1)..n {
            let b = &portfolio.assets[j];
            let corr = match pearson(&a.daily_returns, &b.daily_returns) {
                Ok(c) => c,
                Err(_) => {
                    warnings.push(Warning::DegenerateSeries {
                        first: a.name.clone(),
                        second: b.name.clone(),
                    });
                    0.0
                }
            };
            let cov = corr * a.volatility * b.volatility;
            values[i * n + j] = cov;
            values[j * n + i] = cov;
        }
    }

    (CovarianceMatrix { n, values }, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Asset;
    use approx::assert_abs_diff_eq;

    fn asset(name: &str, volatility: f64, returns: Vec<f64>) -> Asset {
        Asset {
            name: name.to_string(),
            price: 10.0,
            share_count: 1,
            expected_return: 0.001,
            volatility,
            daily_returns: returns,
        }
    }

    fn sample_portfolio() -> Portfolio {
        Portfolio::new(vec![
            asset("A", 0.01, vec![0.01, -0.02, 0.03, 0.0, 0.005]),
            asset("B", 0.02, vec![0.02, -0.01, 0.01, 0.01, -0.005]),
            asset("C", 0.03, vec![-0.01, 0.02, -0.03, 0.01, 0.0]),
        ])
    }

    #[test]
    fn diagonal_is_variance() {
        let (cov, warnings) = build_covariance(&sample_portfolio());
        assert!(warnings.is_empty());
        assert_abs_diff_eq!(cov.get(0, 0), 0.0001, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.get(1, 1), 0.0004, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.get(2, 2), 0.0009, epsilon = 1e-15);
    }

    #[test]
    fn matrix_is_symmetric() {
        let (cov, _) = build_covariance(&sample_portfolio());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(cov.get(i, j), cov.get(j, i));
            }
        }
    }

    #[test]
    fn off_diagonal_scales_correlation() {
        let p = sample_portfolio();
        let (cov, _) = build_covariance(&p);
        let corr = pearson(&p.assets[0].daily_returns, &p.assets[1].daily_returns).unwrap();
        assert_abs_diff_eq!(cov.get(0, 1), corr * 0.01 * 0.02, epsilon = 1e-15);
    }

    #[test]
    fn constant_series_treated_as_uncorrelated() {
        let p = Portfolio::new(vec![
            asset("FLAT", 0.01, vec![0.25, 0.25, 0.25]),
            asset("B", 0.02, vec![0.02, -0.01, 0.01]),
        ]);
        let (cov, warnings) = build_covariance(&p);
        assert_eq!(cov.get(0, 1), 0.0);
        assert_eq!(
            warnings,
            vec![Warning::DegenerateSeries {
                first: "FLAT".into(),
                second: "B".into()
            }]
        );
    }

    #[test]
    fn variance_of_weights() {
        let cov = CovarianceMatrix::from_rows(&[vec![0.04, 0.01], vec![0.01, 0.09]]).unwrap();
        // 0.25*0.04 + 2*0.25*0.01 + 0.25*0.09
        assert_abs_diff_eq!(cov.variance(&[0.5, 0.5]), 0.0375, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.risk(&[1.0, 0.0]), 0.2, epsilon = 1e-15);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        assert!(CovarianceMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0]]).is_err());
    }
}
