//! JSON asset input and JSON optimization report.
//!
//! Input is either a bare array of assets or an object carrying an optional
//! `targetReturn` next to a `stocks` (or `assets`) array.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::asset::AssetRecord;
use crate::domain::error::PortoptError;
use crate::domain::pipeline::{AssetWeight, OptimizationResult};
use crate::ports::asset_port::AssetPort;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetDto {
    name: Option<String>,
    price: Option<f64>,
    #[serde(alias = "activeCount")]
    share_count: Option<u64>,
    expected_return: Option<f64>,
    volatility: Option<f64>,
    daily_returns: Option<Vec<f64>>,
}

impl From<AssetDto> for AssetRecord {
    fn from(dto: AssetDto) -> Self {
        AssetRecord {
            name: dto.name,
            price: dto.price,
            share_count: dto.share_count,
            expected_return: dto.expected_return,
            volatility: dto.volatility,
            daily_returns: dto.daily_returns,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestDto {
    target_return: Option<f64>,
    #[serde(alias = "assets")]
    stocks: Vec<AssetDto>,
}

/// Assets and optional target return parsed from one JSON document.
#[derive(Debug)]
pub struct JsonAssetAdapter {
    records: Vec<AssetRecord>,
    target_return: Option<f64>,
}

impl JsonAssetAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PortoptError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_string(&content, &path.as_ref().display().to_string())
    }

    pub fn from_string(content: &str, source_name: &str) -> Result<Self, PortoptError> {
        let value: Value = serde_json::from_str(content).map_err(|e| PortoptError::Parse {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

        let (assets, target_return) = match value {
            Value::Array(_) => {
                let assets: Vec<AssetDto> = serde_json::from_value(value).map_err(invalid)?;
                (assets, None)
            }
            Value::Object(_) => {
                let request: RequestDto = serde_json::from_value(value).map_err(invalid)?;
                (request.stocks, request.target_return)
            }
            _ => {
                return Err(PortoptError::invalid(
                    "expected an array of assets or an object with a stocks array",
                ));
            }
        };

        Ok(Self {
            records: assets.into_iter().map(AssetRecord::from).collect(),
            target_return,
        })
    }
}

fn invalid(e: serde_json::Error) -> PortoptError {
    PortoptError::invalid(e.to_string())
}

impl AssetPort for JsonAssetAdapter {
    fn load_assets(&self) -> Result<Vec<AssetRecord>, PortoptError> {
        Ok(self.records.clone())
    }

    fn target_return(&self) -> Result<Option<f64>, PortoptError> {
        Ok(self.target_return)
    }
}

#[derive(Serialize)]
struct WeightDto<'a> {
    name: &'a str,
    weight: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrontierPointDto {
    target_return: f64,
    #[serde(rename = "return")]
    achieved_return: f64,
    risk: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HoldingDto<'a> {
    name: &'a str,
    price: f64,
    share_count: u64,
    expected_return: f64,
    volatility: f64,
    daily_returns: &'a [f64],
    active_count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDto<'a> {
    target_return: f64,
    initial_weights: Vec<WeightDto<'a>>,
    optimized_weights: Vec<WeightDto<'a>>,
    portfolio_value: f64,
    final_return: f64,
    final_std: f64,
    frontier: Vec<FrontierPointDto>,
    adjusted_share_counts: Vec<HoldingDto<'a>>,
    allocated_value: f64,
    residue: f64,
    warnings: Vec<String>,
}

impl<'a> From<&'a OptimizationResult> for ReportDto<'a> {
    fn from(result: &'a OptimizationResult) -> Self {
        ReportDto {
            target_return: result.target_return,
            initial_weights: weight_dtos(&result.initial_weights),
            optimized_weights: weight_dtos(&result.optimized_weights),
            portfolio_value: result.portfolio_value,
            final_return: result.final_return,
            final_std: result.final_risk,
            frontier: result
                .frontier
                .iter()
                .map(|p| FrontierPointDto {
                    target_return: p.target_return,
                    achieved_return: p.expected_return,
                    risk: p.risk,
                })
                .collect(),
            adjusted_share_counts: result
                .adjusted_share_counts
                .iter()
                .map(|h| HoldingDto {
                    name: &h.asset.name,
                    price: h.asset.price,
                    share_count: h.asset.share_count,
                    expected_return: h.asset.expected_return,
                    volatility: h.asset.volatility,
                    daily_returns: &h.asset.daily_returns,
                    active_count: h.active_count,
                })
                .collect(),
            allocated_value: result.reconciliation.allocated_value,
            residue: result.reconciliation.residue,
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn weight_dtos(weights: &[AssetWeight]) -> Vec<WeightDto<'_>> {
    weights
        .iter()
        .map(|w| WeightDto {
            name: &w.name,
            weight: w.weight,
        })
        .collect()
}

/// Renders an [`OptimizationResult`] as pretty-printed camelCase JSON.
pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn render(&self, result: &OptimizationResult) -> Result<String, PortoptError> {
        serde_json::to_string_pretty(&ReportDto::from(result)).map_err(|e| {
            PortoptError::Computation {
                reason: format!("report is not representable as JSON: {}", e),
            }
        })
    }
}
