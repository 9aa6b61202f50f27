//! Asset input port trait.

use crate::domain::asset::AssetRecord;
use crate::domain::error::PortoptError;

/// Source of unvalidated asset records for one optimization request.
pub trait AssetPort {
    fn load_assets(&self) -> Result<Vec<AssetRecord>, PortoptError>;

    /// Target return carried by the source itself. Most formats carry none.
    fn target_return(&self) -> Result<Option<f64>, PortoptError> {
        Ok(None)
    }
}
