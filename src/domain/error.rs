//! Domain error and warning types.

use std::fmt;

/// Top-level error type for portopt.
#[derive(Debug, thiserror::Error)]
pub enum PortoptError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid input: {reason}")]
    InputValidation { reason: String },

    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("optimizer failure: {reason}")]
    Computation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortoptError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PortoptError::InputValidation {
            reason: reason.into(),
        }
    }
}

impl From<&PortoptError> for std::process::ExitCode {
    fn from(err: &PortoptError) -> Self {
        let code: u8 = match err {
            PortoptError::Io(_) => 1,
            PortoptError::ConfigParse { .. } | PortoptError::ConfigInvalid { .. } => 2,
            PortoptError::InputValidation { .. } | PortoptError::Parse { .. } => 3,
            PortoptError::DegenerateInput { .. } => 4,
            PortoptError::Computation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Non-fatal condition attached to an otherwise successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Achieved return is further than the tolerance from the target.
    ReturnDeviation { target: f64, achieved: f64 },
    /// Optimized weights summed to ~0; uniform weights were used instead.
    DegenerateWeights { target: f64 },
    /// Correlation between two constant return series is undefined; treated as 0.
    DegenerateSeries { first: String, second: String },
    /// Every frontier point fell back to uniform weights.
    DegenerateFrontier { points: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ReturnDeviation { target, achieved } => write!(
                f,
                "optimized return {achieved:.6} deviates from target {target:.6}"
            ),
            Warning::DegenerateWeights { target } => write!(
                f,
                "optimized weights for target {target:.6} sum to zero; using equal weights"
            ),
            Warning::DegenerateSeries { first, second } => write!(
                f,
                "correlation of {first} and {second} is undefined (constant returns); using 0"
            ),
            Warning::DegenerateFrontier { points } => write!(
                f,
                "all {points} frontier points fell back to equal weights; frontier is partial"
            ),
        }
    }
}
