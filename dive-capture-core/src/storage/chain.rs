//! Durable artifact persistence through a fallback chain of strategies.
//!
//! Order of attempts: previously granted directory handle → save-file
//! picker → browser download. The download fallback cannot fail in a way
//! that loses the artifact, which makes it the guaranteed last resort: a
//! finished recording is never silently discarded.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::models::artifact::{SavedArtifact, StrategyKind};
use crate::models::error::CaptureError;
use crate::storage::metadata;
use crate::traits::storage_target::StorageTarget;

/// Ordered fallback chain over persistence strategies.
pub struct PersistenceChain {
    targets: Vec<Box<dyn StorageTarget>>,
}

impl PersistenceChain {
    pub fn new(targets: Vec<Box<dyn StorageTarget>>) -> Self {
        Self { targets }
    }

    /// Standard chain: granted directory (if any) → picker → download.
    pub fn standard(
        granted_directory: Option<PathBuf>,
        picker: Box<dyn FnMut(&str) -> Option<PathBuf> + Send>,
        download_dir: PathBuf,
    ) -> Self {
        Self::new(vec![
            Box::new(DirectoryHandleTarget::new(granted_directory)),
            Box::new(PickerTarget::new(picker)),
            Box::new(DownloadTarget::new(download_dir)),
        ])
    }

    /// Write the blob via the first strategy that accepts it.
    ///
    /// Unavailable targets are skipped; failures are logged and fall
    /// through. Only exhaustion of the whole chain — which the download
    /// fallback makes effectively impossible — surfaces as `WriteFailure`.
    pub fn save(
        &mut self,
        blob: &[u8],
        filename: &str,
        recording_unit_id: &str,
        duration_ms: u64,
    ) -> Result<SavedArtifact, CaptureError> {
        for target in &mut self.targets {
            if !target.is_available() {
                continue;
            }
            match target.write(blob, filename) {
                Ok(path) => {
                    let artifact = SavedArtifact {
                        filename: filename.to_string(),
                        size_bytes: blob.len() as u64,
                        strategy_used: target.kind(),
                        recording_unit_id: recording_unit_id.to_string(),
                        checksum: sha256_hex(blob),
                        duration_ms,
                        created_at: Utc::now(),
                    };
                    if let Err(err) = metadata::write_sidecar(&artifact, &path) {
                        log::warn!("failed to write metadata sidecar for {}: {}", filename, err);
                    }
                    return Ok(artifact);
                }
                Err(err) => {
                    log::warn!(
                        "{:?} strategy failed for {}: {}; falling back",
                        target.kind(),
                        filename,
                        err
                    );
                }
            }
        }

        Err(CaptureError::WriteFailure(format!(
            "all persistence strategies failed for {}",
            filename
        )))
    }
}

/// Writes directly into a directory the user previously granted access to.
pub struct DirectoryHandleTarget {
    directory: Option<PathBuf>,
}

impl DirectoryHandleTarget {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }
}

impl StorageTarget for DirectoryHandleTarget {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectHandle
    }

    fn is_available(&self) -> bool {
        self.directory.is_some()
    }

    fn write(&mut self, blob: &[u8], filename: &str) -> Result<PathBuf, CaptureError> {
        let dir = self
            .directory
            .as_ref()
            .ok_or_else(|| CaptureError::WriteFailure("no granted directory handle".into()))?;
        write_into(dir, filename, blob)
    }
}

/// Save-file picker seam: the callback runs the interactive dialog and
/// returns the chosen path, or `None` when dismissed.
pub struct PickerTarget {
    picker: Box<dyn FnMut(&str) -> Option<PathBuf> + Send>,
}

impl PickerTarget {
    pub fn new(picker: Box<dyn FnMut(&str) -> Option<PathBuf> + Send>) -> Self {
        Self { picker }
    }
}

impl StorageTarget for PickerTarget {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Picker
    }

    fn is_available(&self) -> bool {
        true
    }

    fn write(&mut self, blob: &[u8], filename: &str) -> Result<PathBuf, CaptureError> {
        let path = (self.picker)(filename)
            .ok_or_else(|| CaptureError::WriteFailure("save dialog dismissed".into()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::WriteFailure(format!("failed to create directory: {}", e)))?;
        }
        fs::write(&path, blob)
            .map_err(|e| CaptureError::WriteFailure(format!("write failed: {}", e)))?;
        Ok(path)
    }
}

/// Browser-download stand-in: writes into the downloads directory and is
/// always available, making it the guaranteed last resort.
pub struct DownloadTarget {
    directory: PathBuf,
}

impl DownloadTarget {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

impl StorageTarget for DownloadTarget {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Download
    }

    fn is_available(&self) -> bool {
        true
    }

    fn write(&mut self, blob: &[u8], filename: &str) -> Result<PathBuf, CaptureError> {
        write_into(&self.directory, filename, blob)
    }
}

fn write_into(dir: &PathBuf, filename: &str, blob: &[u8]) -> Result<PathBuf, CaptureError> {
    fs::create_dir_all(dir)
        .map_err(|e| CaptureError::WriteFailure(format!("failed to create directory: {}", e)))?;
    let path = dir.join(filename);
    fs::write(&path, blob)
        .map_err(|e| CaptureError::WriteFailure(format!("write failed: {}", e)))?;
    Ok(path)
}

/// SHA-256 hex digest of a blob.
pub fn sha256_hex(blob: &[u8]) -> String {
    let digest = Sha256::digest(blob);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
