//! Core domain types and logic.

pub mod asset;
pub mod correlation;
pub mod covariance;
pub mod normalize;
pub mod optimizer;
pub mod frontier;
pub mod reconcile;
pub mod returns;
pub mod pipeline;
pub mod config_validation;
pub mod error;
