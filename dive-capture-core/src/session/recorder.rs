//! Recording session orchestrator.
//!
//! Owns the acquired stream, the pure `SessionMachine`, the buffered chunk
//! payloads, and the persistence chain, and interprets the machine's side
//! effects. The machine decides *what* happens; this type does it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

use crate::models::artifact::{Chunk, SavedArtifact};
use crate::models::codec::CodecProfile;
use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::state::SessionPhase;
use crate::session::machine::{SegmentPlan, SessionMachine, SideEffect};
use crate::storage::chain::PersistenceChain;
use crate::storage::filename;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::media_backend::{ChunkSink, MediaBackend, RecorderHandle, StreamGuard, StreamRequest};

/// One-second time slices, matching the chunk cadence of browser recorders.
const TIMESLICE: Duration = Duration::from_secs(1);

/// Platform/component identifiers tagged onto generated filenames.
#[derive(Default)]
struct LocationTags {
    platform_id: Option<String>,
    component_id: Option<String>,
}

/// State shared between the control surface and the chunk delivery thread.
struct Shared {
    machine: Mutex<SessionMachine>,
    /// Payloads of the current segment, in insertion order.
    buffered: Mutex<Vec<Chunk>>,
    chain: Mutex<PersistenceChain>,
    artifacts: Mutex<Vec<SavedArtifact>>,
    delegate: Mutex<Option<Arc<dyn CaptureDelegate>>>,
    stream: Mutex<Option<StreamGuard>>,
    recording_unit_id: String,
    filename_prefix: String,
    location_tags: Mutex<LocationTags>,
    profile: CodecProfile,
}

impl Shared {
    fn delegate(&self) -> Option<Arc<dyn CaptureDelegate>> {
        self.delegate.lock().clone()
    }

    fn notify_phase(&self) {
        let phase = self.machine.lock().phase().clone();
        if let Some(delegate) = self.delegate() {
            delegate.on_phase_changed(&phase);
        }
    }

    fn apply_effects(&self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                // stream acquisition is interpreted synchronously in start()
                SideEffect::AcquireStream => {}
                SideEffect::ReleaseStream => {
                    if let Some(mut guard) = self.stream.lock().take() {
                        guard.release_now();
                    }
                }
                SideEffect::FinalizeSegment(plan) => self.finalize_segment(plan),
            }
        }
    }

    /// Assemble the segment's buffered chunks into one blob and persist it.
    fn finalize_segment(&self, plan: SegmentPlan) {
        let chunks: Vec<Chunk> = {
            let mut buffered = self.buffered.lock();
            let take = plan.chunk_count.min(buffered.len());
            buffered.drain(..take).collect()
        };

        let mut blob = Vec::with_capacity(plan.byte_size as usize);
        for chunk in &chunks {
            blob.extend_from_slice(&chunk.data);
        }

        let name = {
            let tags = self.location_tags.lock();
            filename::artifact_filename(
                &self.filename_prefix,
                Utc::now(),
                tags.platform_id.as_deref(),
                tags.component_id.as_deref(),
                &self.profile.extension,
            )
        };

        match self.chain.lock().save(&blob, &name, &self.recording_unit_id, plan.duration_ms) {
            Ok(artifact) => {
                self.artifacts.lock().push(artifact.clone());
                if let Some(delegate) = self.delegate() {
                    delegate.on_segment_saved(&artifact);
                }
            }
            Err(err) => {
                // only reachable when even the download fallback failed
                log::error!("failed to persist segment {}: {}", name, err);
                if let Some(delegate) = self.delegate() {
                    delegate.on_error(&err);
                }
            }
        }
    }
}

/// A live recording session wrapping an acquired capture stream.
///
/// Destroyed when stopped and fully persisted; at most one of these should
/// hold a given device's stream at a time.
pub struct RecordingSession<B: MediaBackend> {
    backend: Arc<B>,
    shared: Arc<Shared>,
    recorder: Mutex<Option<Box<dyn RecorderHandle>>>,
}

impl<B: MediaBackend> RecordingSession<B> {
    pub fn new(
        backend: Arc<B>,
        chain: PersistenceChain,
        profile: CodecProfile,
        recording_unit_id: impl Into<String>,
        filename_prefix: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            shared: Arc::new(Shared {
                machine: Mutex::new(SessionMachine::new()),
                buffered: Mutex::new(Vec::new()),
                chain: Mutex::new(chain),
                artifacts: Mutex::new(Vec::new()),
                delegate: Mutex::new(None),
                stream: Mutex::new(None),
                recording_unit_id: recording_unit_id.into(),
                filename_prefix: filename_prefix.into(),
                location_tags: Mutex::new(LocationTags::default()),
                profile,
            }),
            recorder: Mutex::new(None),
        }
    }

    /// Tag generated filenames with platform/component identifiers. Takes
    /// effect for every segment finalized afterwards, including mid-session.
    pub fn set_location_tags(&self, platform_id: Option<String>, component_id: Option<String>) {
        *self.shared.location_tags.lock() = LocationTags { platform_id, component_id };
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureDelegate>) {
        *self.shared.delegate.lock() = Some(delegate);
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.machine.lock().phase().clone()
    }

    pub fn session_id(&self) -> String {
        self.shared.machine.lock().id().to_string()
    }

    /// Artifacts persisted so far (auto-split segments appear as they close).
    pub fn artifacts(&self) -> Vec<SavedArtifact> {
        self.shared.artifacts.lock().clone()
    }

    /// Wall-clock active duration, the only duration authority.
    pub fn duration_ms(&self) -> u64 {
        self.shared.machine.lock().accumulated_duration_ms(Instant::now())
    }

    /// Acquire the stream and start the chunked recorder.
    ///
    /// Failure transitions to `Failed` with the typed cause and never
    /// leaves a partially-acquired stream open.
    pub fn start(&self, config: CaptureConfig) -> Result<(), CaptureError> {
        let effects = self.shared.machine.lock().start(config.clone(), Instant::now())?;
        debug_assert_eq!(effects, vec![SideEffect::AcquireStream]);
        self.shared.notify_phase();

        let request = StreamRequest {
            video_device_id: config.video_device_id.clone(),
            audio_device_id: config.audio_device_id.clone(),
            resolution: config.resolution,
            frame_rate: config.frame_rate,
        };

        let guard = match self.backend.open_stream(&request) {
            Ok(stream) => StreamGuard::new(stream),
            Err(err) => return Err(self.fail(err)),
        };

        let sink = self.make_sink();
        let recorder = match guard.stream() {
            Some(stream) => {
                match self.backend.start_recorder(stream, &self.shared.profile, TIMESLICE, sink) {
                    Ok(recorder) => recorder,
                    Err(err) => {
                        drop(guard); // releases the stream
                        return Err(self.fail(err));
                    }
                }
            }
            None => return Err(self.fail(CaptureError::DeviceUnavailable("stream vanished".into()))),
        };

        *self.shared.stream.lock() = Some(guard);
        *self.recorder.lock() = Some(recorder);
        Ok(())
    }

    /// Halt chunk collection; the session and its chunks remain intact.
    pub fn pause(&self) -> Result<(), CaptureError> {
        self.shared.machine.lock().pause(Instant::now())?;
        if let Some(recorder) = self.recorder.lock().as_mut() {
            recorder.pause()?;
        }
        self.shared.notify_phase();
        Ok(())
    }

    pub fn resume(&self) -> Result<(), CaptureError> {
        self.shared.machine.lock().resume(Instant::now())?;
        if let Some(recorder) = self.recorder.lock().as_mut() {
            recorder.resume()?;
        }
        self.shared.notify_phase();
        Ok(())
    }

    /// Stop recording, flush buffered chunks into the final artifact, and
    /// release the stream. Returns every artifact the session produced.
    /// Valid as soon as `start` succeeds — stopping before the first chunk
    /// arrives produces an empty artifact and still releases the stream.
    pub fn stop(&self) -> Result<Vec<SavedArtifact>, CaptureError> {
        // stop the recorder first so in-flight chunks flush through the sink
        if let Some(mut recorder) = self.recorder.lock().take() {
            if let Err(err) = recorder.stop() {
                log::warn!("recorder stop reported {}; buffered chunks are kept", err);
            }
        }

        let effects = self.shared.machine.lock().stop(Instant::now())?;
        self.shared.notify_phase();
        self.shared.apply_effects(effects);

        self.shared.machine.lock().finalized()?;
        self.shared.notify_phase();

        Ok(self.artifacts())
    }

    fn fail(&self, cause: CaptureError) -> CaptureError {
        let effects = self.shared.machine.lock().fail(cause.clone(), Instant::now());
        self.shared.apply_effects(effects);
        if let Some(delegate) = self.shared.delegate() {
            delegate.on_error(&cause);
        }
        self.shared.notify_phase();
        cause
    }

    fn make_sink(&self) -> ChunkSink {
        let shared = Arc::clone(&self.shared);
        Arc::new(move |chunk: Chunk| {
            let (effects, became_recording) = {
                let mut machine = shared.machine.lock();
                let was_requesting = matches!(machine.phase(), SessionPhase::Requesting);
                if !was_requesting && !machine.phase().is_recording() {
                    return; // paused or stopping: the chunk is not collected
                }
                let effects = machine.chunk_arrived(chunk.meta(), Instant::now());
                (effects, was_requesting && machine.phase().is_recording())
            };

            // a split's FinalizeSegment drains exactly the previous
            // segment's chunks; the triggering chunk is buffered after
            shared.apply_effects(effects);
            shared.buffered.lock().push(chunk);

            if became_recording {
                shared.notify_phase();
            }
        })
    }
}
