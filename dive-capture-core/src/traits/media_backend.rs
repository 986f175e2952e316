use std::sync::Arc;
use std::time::Duration;

use crate::models::artifact::Chunk;
use crate::models::codec::CodecProfile;
use crate::models::config::Resolution;
use crate::models::device::{DeviceCapabilities, DeviceDescriptor};
use crate::models::error::CaptureError;

/// Callback invoked when the recorder delivers a time-sliced chunk.
///
/// The callback fires on the backend's delivery thread — keep processing
/// minimal.
pub type ChunkSink = Arc<dyn Fn(Chunk) + Send + Sync + 'static>;

/// Device selection and constraints for `open_stream`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub video_device_id: Option<String>,
    pub audio_device_id: Option<String>,
    pub resolution: Resolution,
    pub frame_rate: f64,
}

/// A live capture stream acquired from one or more devices.
pub trait MediaStream: Send + Sync {
    /// Hardware limits of the video device backing this stream, if reported.
    fn capabilities(&self) -> Option<DeviceCapabilities>;

    /// Release the underlying devices. Must be idempotent.
    fn release(&mut self);
}

/// Control handle for a running chunked recorder.
pub trait RecorderHandle: Send + Sync {
    fn pause(&mut self) -> Result<(), CaptureError>;

    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Stop the recorder. Buffered chunks are still flushed to the sink
    /// before this returns — stopping mid-chunk never discards data.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Platform seam for media capture primitives.
///
/// A browser/WebView deployment implements this over the user-media,
/// chunked-recorder, and file-system-access APIs; tests drive the pipeline
/// with mock backends.
pub trait MediaBackend: Send + Sync {
    /// List capture devices without forcing a permission prompt.
    ///
    /// Labels may be generic until a prior capability query has been granted.
    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, CaptureError>;

    /// Monotonic counter bumped on every device hot-plug notification.
    ///
    /// A capability query that observes a different value after acquiring
    /// the stream must discard its result as stale.
    fn device_generation(&self) -> u64;

    /// Acquire an exclusive stream for the given devices and constraints.
    fn open_stream(&self, request: &StreamRequest) -> Result<Box<dyn MediaStream>, CaptureError>;

    /// Whether the runtime can record the given MIME type.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Whether a chunked-recording primitive exists at all.
    fn supports_chunked_recording(&self) -> bool;

    /// Whether a directory-write primitive exists.
    fn supports_directory_access(&self) -> bool;

    /// Start a chunked recorder on an acquired stream, delivering one chunk
    /// per `timeslice` via `sink`.
    fn start_recorder(
        &self,
        stream: &dyn MediaStream,
        profile: &CodecProfile,
        timeslice: Duration,
        sink: ChunkSink,
    ) -> Result<Box<dyn RecorderHandle>, CaptureError>;
}

/// RAII wrapper guaranteeing a stream is released on every exit path,
/// success or error. Capability queries and sessions hold their stream
/// through one of these so a panic or early return cannot leave a device
/// LED lit.
pub struct StreamGuard {
    stream: Option<Box<dyn MediaStream>>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream: Some(stream) }
    }

    pub fn capabilities(&self) -> Option<DeviceCapabilities> {
        self.stream.as_ref().and_then(|s| s.capabilities())
    }

    pub fn stream(&self) -> Option<&dyn MediaStream> {
        self.stream.as_deref()
    }

    /// Release the stream now instead of waiting for drop.
    pub fn release_now(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release_now();
    }
}
