#![allow(dead_code)]

use portopt::domain::asset::AssetRecord;
use portopt::domain::frontier::FrontierConfig;
use portopt::domain::pipeline::PipelineConfig;
use std::io::Write;

/// Two return series with zero sample correlation.
pub const ORTHOGONAL_A: [f64; 4] = [1.0, -1.0, 1.0, -1.0];
pub const ORTHOGONAL_B: [f64; 4] = [1.0, 1.0, -1.0, -1.0];

pub fn make_record(
    name: &str,
    price: f64,
    share_count: u64,
    expected_return: f64,
    volatility: f64,
    daily_returns: &[f64],
) -> AssetRecord {
    AssetRecord {
        name: Some(name.to_string()),
        price: Some(price),
        share_count: Some(share_count),
        expected_return: Some(expected_return),
        volatility: Some(volatility),
        daily_returns: Some(daily_returns.to_vec()),
    }
}

/// expectedReturn [0.001, 0.002], volatility [0.01, 0.02], uncorrelated.
pub fn two_asset_records() -> Vec<AssetRecord> {
    vec![
        make_record("BOND", 10.0, 60, 0.001, 0.01, &ORTHOGONAL_A),
        make_record("EQUITY", 20.0, 20, 0.002, 0.02, &ORTHOGONAL_B),
    ]
}

pub fn three_asset_records() -> Vec<AssetRecord> {
    vec![
        make_record("AAA", 12.5, 40, 0.0008, 0.012, &[0.01, -0.02, 0.015, 0.0, -0.005, 0.02]),
        make_record("BBB", 48.0, 10, 0.0015, 0.018, &[0.02, -0.01, 0.01, 0.01, -0.015, 0.005]),
        make_record("CCC", 103.0, 5, 0.0022, 0.025, &[-0.01, 0.03, -0.02, 0.015, 0.01, -0.005]),
    ]
}

pub fn sequential_config(num_points: usize) -> PipelineConfig {
    PipelineConfig {
        frontier: FrontierConfig {
            num_points,
            parallel: false,
        },
        ..PipelineConfig::default()
    }
}

pub fn write_temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
