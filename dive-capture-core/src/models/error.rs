use thiserror::Error;

/// Errors that can occur across the capture pipeline.
///
/// Device and codec errors abort the current session and are never retried
/// automatically; `WriteFailure` is recoverable via the persistence fallback
/// chain and only surfaces when the final fallback itself fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("codec not supported: {0}")]
    CodecUnsupported(String),

    #[error("no codec in the catalog is supported by this runtime")]
    NoCodecAvailable,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("configuration rejected: {0}")]
    ConfigurationRejected(String),

    #[error("write failed: {0}")]
    WriteFailure(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
