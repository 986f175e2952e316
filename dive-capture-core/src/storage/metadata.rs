use std::fs;
use std::path::Path;

use crate::models::artifact::SavedArtifact;
use crate::models::error::CaptureError;

/// Write artifact metadata as a JSON sidecar file.
///
/// Creates `{artifact_path}.metadata.json` alongside the artifact. The
/// sidecar carries the tracked duration, since the container format itself
/// frequently omits it.
pub fn write_sidecar(artifact: &SavedArtifact, artifact_path: &Path) -> Result<(), CaptureError> {
    let sidecar_path = artifact_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(artifact)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&sidecar_path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read artifact metadata from a JSON sidecar file.
pub fn read_sidecar(artifact_path: &Path) -> Result<SavedArtifact, CaptureError> {
    let sidecar_path = artifact_path.with_extension("metadata.json");
    let json = fs::read_to_string(&sidecar_path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}
