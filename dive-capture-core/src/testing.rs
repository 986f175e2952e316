//! Mock `MediaBackend` implementation shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::artifact::Chunk;
use crate::models::codec::CodecProfile;
use crate::models::device::{DeviceCapabilities, DeviceDescriptor};
use crate::models::error::CaptureError;
use crate::traits::media_backend::{ChunkSink, MediaBackend, MediaStream, RecorderHandle, StreamRequest};

pub(crate) struct MockStream {
    pub capabilities: Option<DeviceCapabilities>,
    pub released: Arc<AtomicBool>,
}

impl MediaStream for MockStream {
    fn capabilities(&self) -> Option<DeviceCapabilities> {
        self.capabilities
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

pub(crate) struct MockRecorder {
    pub stopped: Arc<AtomicBool>,
}

impl RecorderHandle for MockRecorder {
    fn pause(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Scriptable backend: tests configure the device list, the supported MIME
/// set, failure modes, and drive chunk delivery through the captured sink.
pub(crate) struct MockBackend {
    pub devices: Vec<DeviceDescriptor>,
    pub enumeration_fails: bool,
    pub supported_mimes: Vec<String>,
    pub chunked_recording: bool,
    pub directory_access: bool,
    pub capabilities: Option<DeviceCapabilities>,
    pub open_stream_error: Option<CaptureError>,
    pub generation: AtomicU64,
    /// Simulates a hot-plug landing while a capability query holds the stream.
    pub bump_generation_on_open: bool,
    pub last_stream_released: Arc<AtomicBool>,
    pub recorder_stopped: Arc<AtomicBool>,
    pub sink: Mutex<Option<ChunkSink>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            enumeration_fails: false,
            supported_mimes: vec!["video/webm;codecs=vp9,opus".into()],
            chunked_recording: true,
            directory_access: true,
            capabilities: Some(DeviceCapabilities {
                max_width: 1920,
                max_height: 1080,
                max_frame_rate: 30.0,
            }),
            open_stream_error: None,
            generation: AtomicU64::new(0),
            bump_generation_on_open: false,
            last_stream_released: Arc::new(AtomicBool::new(false)),
            recorder_stopped: Arc::new(AtomicBool::new(false)),
            sink: Mutex::new(None),
        }
    }
}

impl MockBackend {
    /// Push a chunk through the sink captured by `start_recorder`.
    pub fn deliver_chunk(&self, chunk: Chunk) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(chunk);
        }
    }
}

impl MediaBackend for MockBackend {
    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, CaptureError> {
        if self.enumeration_fails {
            return Err(CaptureError::DeviceUnavailable("enumeration failed".into()));
        }
        Ok(self.devices.clone())
    }

    fn device_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn open_stream(&self, _request: &StreamRequest) -> Result<Box<dyn MediaStream>, CaptureError> {
        if let Some(ref err) = self.open_stream_error {
            return Err(err.clone());
        }
        if self.bump_generation_on_open {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.last_stream_released.store(false, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            capabilities: self.capabilities,
            released: Arc::clone(&self.last_stream_released),
        }))
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported_mimes.iter().any(|m| m == mime_type)
    }

    fn supports_chunked_recording(&self) -> bool {
        self.chunked_recording
    }

    fn supports_directory_access(&self) -> bool {
        self.directory_access
    }

    fn start_recorder(
        &self,
        _stream: &dyn MediaStream,
        _profile: &CodecProfile,
        _timeslice: Duration,
        sink: ChunkSink,
    ) -> Result<Box<dyn RecorderHandle>, CaptureError> {
        *self.sink.lock() = Some(sink);
        Ok(Box::new(MockRecorder {
            stopped: Arc::clone(&self.recorder_stopped),
        }))
    }
}

pub(crate) fn video_device(id: &str, label: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        id: id.into(),
        label: label.into(),
        kind: crate::models::device::DeviceKind::Video,
        capabilities: None,
    }
}

pub(crate) fn audio_device(id: &str, label: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        id: id.into(),
        label: label.into(),
        kind: crate::models::device::DeviceKind::Audio,
        capabilities: None,
    }
}
