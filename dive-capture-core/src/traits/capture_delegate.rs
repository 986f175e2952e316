use crate::models::artifact::SavedArtifact;
use crate::models::error::CaptureError;
use crate::models::state::SessionPhase;

/// Event delegate for recording session notifications.
///
/// All methods are called from the chunk delivery thread, not the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session phase changes.
    fn on_phase_changed(&self, phase: &SessionPhase);

    /// Called when a segment (auto-split or final) has been durably saved.
    fn on_segment_saved(&self, artifact: &SavedArtifact);

    /// Called when an error occurs during capture.
    fn on_error(&self, error: &CaptureError);
}
