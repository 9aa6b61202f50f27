//! Report generation port trait.

use std::fs;

use crate::domain::error::PortoptError;
use crate::domain::pipeline::OptimizationResult;

/// Port for rendering and writing optimization reports.
pub trait ReportPort {
    fn render(&self, result: &OptimizationResult) -> Result<String, PortoptError>;

    /// Default implementation: writes the rendered report to `output_path`.
    fn write(&self, result: &OptimizationResult, output_path: &str) -> Result<(), PortoptError> {
        let content = self.render(result)?;
        fs::write(output_path, content)?;
        Ok(())
    }
}
