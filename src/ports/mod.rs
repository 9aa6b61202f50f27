//! Port traits between the domain and its inputs/outputs.

pub mod asset_port;
pub mod config_port;
pub mod report_port;
