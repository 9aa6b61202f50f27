//! Daily-return statistics from a closing-price history.
//!
//! r[k] = (C[k+1] - C[k]) / C[k]
//! expected return = mean(r), volatility = population stddev(r)
//! Risk score buckets use volatility annualized over 252 trading days.

use std::fmt;

use super::correlation::mean;
use super::error::PortoptError;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const LOW_RISK_CEILING: f64 = 0.15;
const MEDIUM_RISK_CEILING: f64 = 0.25;
/// Expected daily return below this escalates the risk score one level.
const LOSS_ESCALATION: f64 = -0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskScore {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskScore::Low => "Low",
            RiskScore::Medium => "Medium",
            RiskScore::High => "High",
            RiskScore::VeryHigh => "Very High",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatistics {
    pub daily_returns: Vec<f64>,
    pub expected_return: f64,
    pub volatility: f64,
    pub annualized_volatility: f64,
    pub risk_score: RiskScore,
}

pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

pub fn population_stddev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn classify_risk(annualized_volatility: f64, expected_return: f64) -> RiskScore {
    let base = if annualized_volatility < LOW_RISK_CEILING {
        RiskScore::Low
    } else if annualized_volatility < MEDIUM_RISK_CEILING {
        RiskScore::Medium
    } else {
        RiskScore::High
    };

    if expected_return < LOSS_ESCALATION {
        match base {
            RiskScore::High => RiskScore::VeryHigh,
            _ => RiskScore::High,
        }
    } else {
        base
    }
}

pub fn compute_statistics(closes: &[f64]) -> Result<ReturnStatistics, PortoptError> {
    if closes.len() < 2 {
        return Err(PortoptError::invalid(format!(
            "need at least 2 closing prices, got {}",
            closes.len()
        )));
    }
    if let Some(bad) = closes.iter().find(|c| !c.is_finite() || **c <= 0.0) {
        return Err(PortoptError::invalid(format!(
            "closing prices must be positive, got {bad}"
        )));
    }

    let daily_returns = daily_returns(closes);
    let expected_return = mean(&daily_returns);
    let volatility = population_stddev(&daily_returns);
    let annualized_volatility = volatility * TRADING_DAYS_PER_YEAR.sqrt();

    Ok(ReturnStatistics {
        risk_score: classify_risk(annualized_volatility, expected_return),
        daily_returns,
        expected_return,
        volatility,
        annualized_volatility,
    })
}
