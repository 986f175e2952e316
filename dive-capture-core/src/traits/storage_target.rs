use std::path::PathBuf;

use crate::models::artifact::StrategyKind;
use crate::models::error::CaptureError;

/// One persistence mechanism in the fallback chain.
///
/// Implemented by the direct directory handle, the save-file picker, and
/// the browser-download fallback. Availability is probed per save so a
/// revoked grant falls through to the next target.
pub trait StorageTarget: Send {
    fn kind(&self) -> StrategyKind;

    /// Whether this target can currently accept writes.
    fn is_available(&self) -> bool;

    /// Write the blob under `filename`, returning the final path.
    fn write(&mut self, blob: &[u8], filename: &str) -> Result<PathBuf, CaptureError>;
}
