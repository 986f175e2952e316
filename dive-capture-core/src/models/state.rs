use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → requesting → recording ↔ paused
///            ↓            ↓          ↓
///            └───────→ stopping → stopped
/// ```
/// `failed` is reachable from any non-terminal state and carries the typed
/// cause; any acquired stream is released before entering it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Requesting,
    Recording,
    Paused,
    Stopping,
    Stopped,
    Failed(CaptureError),
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether the session currently holds an acquired device stream.
    pub fn holds_stream(&self) -> bool {
        matches!(self, Self::Requesting | Self::Recording | Self::Paused | Self::Stopping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }
}
