//! Asset records, validated assets and the portfolio they form.

use std::collections::HashSet;

use super::error::PortoptError;

/// Asset as read from an input source, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetRecord {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub share_count: Option<u64>,
    pub expected_return: Option<f64>,
    pub volatility: Option<f64>,
    pub daily_returns: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub name: String,
    pub price: f64,
    pub share_count: u64,
    pub expected_return: f64,
    pub volatility: f64,
    pub daily_returns: Vec<f64>,
}

impl Asset {
    pub fn market_value(&self) -> f64 {
        self.price * self.share_count as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub assets: Vec<Asset>,
}

impl Portfolio {
    pub fn new(assets: Vec<Asset>) -> Self {
        Portfolio { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn current_value(&self) -> f64 {
        self.assets.iter().map(Asset::market_value).sum()
    }

    pub fn expected_returns(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.expected_return).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.price).collect()
    }

    /// Current allocation by market value. Uniform when the portfolio holds nothing.
    pub fn value_weights(&self) -> Vec<f64> {
        let total = self.current_value();
        if total <= 0.0 {
            return vec![1.0 / self.len() as f64; self.len()];
        }
        self.assets
            .iter()
            .map(|a| a.market_value() / total)
            .collect()
    }
}

/// Minimum number of daily returns needed for a correlation estimate.
pub const MIN_RETURN_OBSERVATIONS: usize = 2;

/// Validate raw records into a portfolio. Nothing is computed on failure.
pub fn validate_assets(records: &[AssetRecord]) -> Result<Portfolio, PortoptError> {
    if records.len() < 2 {
        return Err(PortoptError::invalid(format!(
            "portfolio must contain at least 2 assets, got {}",
            records.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut assets = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let asset = validate_record(idx, record)?;
        if !seen.insert(asset.name.clone()) {
            return Err(PortoptError::invalid(format!(
                "duplicate asset name '{}'",
                asset.name
            )));
        }
        assets.push(asset);
    }

    let series_len = assets[0].daily_returns.len();
    if let Some(mismatch) = assets
        .iter()
        .find(|a| a.daily_returns.len() != series_len)
    {
        return Err(PortoptError::invalid(format!(
            "daily returns must have equal length: '{}' has {}, '{}' has {}",
            assets[0].name,
            series_len,
            mismatch.name,
            mismatch.daily_returns.len()
        )));
    }

    Ok(Portfolio::new(assets))
}

pub fn validate_target_return(target: f64) -> Result<f64, PortoptError> {
    if !target.is_finite() {
        return Err(PortoptError::invalid(format!(
            "target return must be a finite number, got {target}"
        )));
    }
    Ok(target)
}

fn validate_record(idx: usize, record: &AssetRecord) -> Result<Asset, PortoptError> {
    let name = match record.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return Err(PortoptError::invalid(format!(
                "asset #{} is missing a name",
                idx + 1
            )));
        }
    };

    let missing = |field: &str| PortoptError::invalid(format!("asset '{name}' is missing {field}"));

    let price = record.price.ok_or_else(|| missing("price"))?;
    let share_count = record.share_count.ok_or_else(|| missing("share_count"))?;
    let expected_return = record
        .expected_return
        .ok_or_else(|| missing("expected_return"))?;
    let volatility = record.volatility.ok_or_else(|| missing("volatility"))?;
    let daily_returns = record
        .daily_returns
        .clone()
        .ok_or_else(|| missing("daily_returns"))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(PortoptError::invalid(format!(
            "asset '{name}' price must be positive, got {price}"
        )));
    }
    if !expected_return.is_finite() {
        return Err(PortoptError::invalid(format!(
            "asset '{name}' expected_return must be finite"
        )));
    }
    if !volatility.is_finite() || volatility < 0.0 {
        return Err(PortoptError::invalid(format!(
            "asset '{name}' volatility must be non-negative, got {volatility}"
        )));
    }
    if daily_returns.len() < MIN_RETURN_OBSERVATIONS {
        return Err(PortoptError::invalid(format!(
            "asset '{name}' needs at least {MIN_RETURN_OBSERVATIONS} daily returns, got {}",
            daily_returns.len()
        )));
    }
    if daily_returns.iter().any(|r| !r.is_finite()) {
        return Err(PortoptError::invalid(format!(
            "asset '{name}' daily_returns contain a non-finite value"
        )));
    }

    Ok(Asset {
        name,
        price,
        share_count,
        expected_return,
        volatility,
        daily_returns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn record(name: &str, price: f64, count: u64) -> AssetRecord {
        AssetRecord {
            name: Some(name.to_string()),
            price: Some(price),
            share_count: Some(count),
            expected_return: Some(0.001),
            volatility: Some(0.02),
            daily_returns: Some(vec![0.01, -0.02, 0.015, 0.0]),
        }
    }

    #[test]
    fn validates_well_formed_records() {
        let portfolio = validate_assets(&[record("AAA", 10.0, 5), record("BBB", 20.0, 5)]).unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.assets[1].name, "BBB");
        assert_abs_diff_eq!(portfolio.current_value(), 150.0);
    }

    #[test]
    fn rejects_single_asset() {
        let err = validate_assets(&[record("AAA", 10.0, 5)]).unwrap_err();
        assert!(matches!(err, PortoptError::InputValidation { .. }));
    }

    #[test]
    fn rejects_missing_volatility() {
        let mut bad = record("BBB", 20.0, 1);
        bad.volatility = None;
        let err = validate_assets(&[record("AAA", 10.0, 5), bad]).unwrap_err();
        match err {
            PortoptError::InputValidation { reason } => assert!(reason.contains("volatility")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = validate_assets(&[record("AAA", 10.0, 5), record("AAA", 20.0, 1)]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = validate_assets(&[record("AAA", 0.0, 5), record("BBB", 20.0, 1)]).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn rejects_negative_volatility() {
        let mut bad = record("BBB", 20.0, 1);
        bad.volatility = Some(-0.1);
        assert!(validate_assets(&[record("AAA", 10.0, 5), bad]).is_err());
    }

    #[test]
    fn rejects_unequal_series_lengths() {
        let mut short = record("BBB", 20.0, 1);
        short.daily_returns = Some(vec![0.01, 0.02, 0.03]);
        let err = validate_assets(&[record("AAA", 10.0, 5), short]).unwrap_err();
        assert!(err.to_string().contains("equal length"));
    }

    #[test]
    fn rejects_too_short_series() {
        let mut a = record("AAA", 10.0, 1);
        let mut b = record("BBB", 20.0, 1);
        a.daily_returns = Some(vec![0.01]);
        b.daily_returns = Some(vec![0.02]);
        assert!(validate_assets(&[a, b]).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        let blank = record("  ", 20.0, 1);
        let err = validate_assets(&[record("AAA", 10.0, 5), blank]).unwrap_err();
        assert!(err.to_string().contains("missing a name"));
    }

    #[test]
    fn value_weights_follow_market_value() {
        let portfolio = validate_assets(&[record("AAA", 10.0, 3), record("BBB", 20.0, 1)]).unwrap();
        let w = portfolio.value_weights();
        assert_abs_diff_eq!(w[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(w[1], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn value_weights_uniform_for_empty_holdings() {
        let portfolio = validate_assets(&[record("AAA", 10.0, 0), record("BBB", 20.0, 0)]).unwrap();
        assert_eq!(portfolio.value_weights(), vec![0.5, 0.5]);
    }

    #[test]
    fn target_return_must_be_finite() {
        assert!(validate_target_return(f64::NAN).is_err());
        assert_eq!(validate_target_return(0.0015).unwrap(), 0.0015);
    }
}
