//! Pure recording-session state machine.
//!
//! The underlying chunked-recording primitive is callback-based; this type
//! makes the session explicit instead: transition functions take an injected
//! `Instant` and return side-effect descriptors, so tests can drive every
//! transition without a real device. The orchestrator in `recorder.rs`
//! interprets the effects.

use std::time::Instant;

use crate::models::artifact::ChunkMeta;
use crate::models::config::{AutoSplitPolicy, CaptureConfig};
use crate::models::error::CaptureError;
use crate::models::state::SessionPhase;

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    AcquireStream,
    ReleaseStream,
    FinalizeSegment(SegmentPlan),
}

/// Everything the orchestrator needs to turn the buffered chunks into one
/// durable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    pub file_index: u32,
    pub chunk_count: usize,
    pub byte_size: u64,
    /// Wall-clock active duration of this segment. The container format
    /// frequently omits duration metadata, so this tracked value is the
    /// only duration authority.
    pub duration_ms: u64,
}

/// Recording session state machine.
///
/// At most one active chunk collector exists at a time; chunk insertion
/// order is the sole ordering authority. Auto-split closes the current
/// segment *before* the threshold-crossing chunk, which then opens the next
/// segment — nothing is ever dropped at the boundary.
pub struct SessionMachine {
    id: String,
    phase: SessionPhase,
    config: Option<CaptureConfig>,
    chunks: Vec<ChunkMeta>,
    file_index: u32,
    segment_bytes: u64,
    /// Active time already folded into accumulators (excludes pauses).
    session_accum_ms: u64,
    segment_accum_ms: u64,
    /// Set while actively recording; `None` while paused or not started.
    active_since: Option<Instant>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            phase: SessionPhase::Idle,
            config: None,
            chunks: Vec::new(),
            file_index: 0,
            segment_bytes: 0,
            session_accum_ms: 0,
            segment_accum_ms: 0,
            active_since: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn config(&self) -> Option<&CaptureConfig> {
        self.config.as_ref()
    }

    pub fn current_file_index(&self) -> u32 {
        self.file_index
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total active recording time, wall-clock, excluding pauses.
    pub fn accumulated_duration_ms(&self, now: Instant) -> u64 {
        self.session_accum_ms + self.running_ms(now)
    }

    /// Transition `Idle → Requesting`.
    pub fn start(&mut self, config: CaptureConfig, _now: Instant) -> Result<Vec<SideEffect>, CaptureError> {
        if !self.phase.is_idle() {
            return Err(CaptureError::InvalidTransition(format!(
                "start is only valid from idle, not {:?}",
                self.phase
            )));
        }
        self.config = Some(config);
        self.phase = SessionPhase::Requesting;
        Ok(vec![SideEffect::AcquireStream])
    }

    /// A chunk arrived from the recorder.
    ///
    /// The first chunk transitions `Requesting → Recording` and starts the
    /// duration clock. A chunk that would cross the auto-split threshold
    /// first finalizes the current segment and then lands as the first chunk
    /// of the new one.
    pub fn chunk_arrived(&mut self, meta: ChunkMeta, now: Instant) -> Vec<SideEffect> {
        match self.phase {
            SessionPhase::Requesting => {
                self.phase = SessionPhase::Recording;
                self.active_since = Some(now);
            }
            SessionPhase::Recording => {}
            _ => {
                log::debug!("ignoring chunk delivered in phase {:?}", self.phase);
                return Vec::new();
            }
        }

        let mut effects = Vec::new();
        if !self.chunks.is_empty() && self.crosses_threshold(meta.byte_size, now) {
            effects.push(SideEffect::FinalizeSegment(self.take_segment(now)));
        }

        self.segment_bytes += meta.byte_size;
        self.chunks.push(meta);
        effects
    }

    /// Transition `Recording → Paused`. Chunk collection halts; the session
    /// and its accumulated chunks remain intact.
    pub fn pause(&mut self, now: Instant) -> Result<Vec<SideEffect>, CaptureError> {
        if !self.phase.is_recording() {
            return Err(CaptureError::InvalidTransition(format!(
                "pause is only valid while recording, not {:?}",
                self.phase
            )));
        }
        self.fold_active(now);
        self.phase = SessionPhase::Paused;
        Ok(Vec::new())
    }

    /// Transition `Paused → Recording`.
    pub fn resume(&mut self, now: Instant) -> Result<Vec<SideEffect>, CaptureError> {
        if !self.phase.is_paused() {
            return Err(CaptureError::InvalidTransition(format!(
                "resume is only valid while paused, not {:?}",
                self.phase
            )));
        }
        self.active_since = Some(now);
        self.phase = SessionPhase::Recording;
        Ok(Vec::new())
    }

    /// Transition `Requesting/Recording/Paused → Stopping`.
    ///
    /// Buffered chunks are always flushed into a final artifact, even when
    /// the segment is empty — a session that reached `Stopped` always
    /// produced an artifact. Stopping while still `Requesting` (before the
    /// first chunk) yields an empty final segment and still releases the
    /// stream.
    pub fn stop(&mut self, now: Instant) -> Result<Vec<SideEffect>, CaptureError> {
        if !matches!(
            self.phase,
            SessionPhase::Requesting | SessionPhase::Recording | SessionPhase::Paused
        ) {
            return Err(CaptureError::InvalidTransition(format!(
                "stop is only valid while requesting, recording, or paused, not {:?}",
                self.phase
            )));
        }
        self.fold_active(now);
        self.phase = SessionPhase::Stopping;
        Ok(vec![
            SideEffect::FinalizeSegment(self.take_segment(now)),
            SideEffect::ReleaseStream,
        ])
    }

    /// Transition `Stopping → Stopped`, once the final artifact is durable.
    pub fn finalized(&mut self) -> Result<(), CaptureError> {
        if !matches!(self.phase, SessionPhase::Stopping) {
            return Err(CaptureError::InvalidTransition(format!(
                "finalized is only valid while stopping, not {:?}",
                self.phase
            )));
        }
        self.phase = SessionPhase::Stopped;
        Ok(())
    }

    /// Enter `Failed` from any non-terminal phase with a typed cause.
    ///
    /// Any acquired stream is released before the state is observable as
    /// failed, so a denied permission or vanished device never leaves a
    /// half-acquired stream open.
    pub fn fail(&mut self, cause: CaptureError, now: Instant) -> Vec<SideEffect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.fold_active(now);
        let held_stream = self.phase.holds_stream();
        self.phase = SessionPhase::Failed(cause);
        if held_stream {
            vec![SideEffect::ReleaseStream]
        } else {
            Vec::new()
        }
    }

    // --- Internal helpers ---

    fn running_ms(&self, now: Instant) -> u64 {
        self.active_since
            .map(|since| now.saturating_duration_since(since).as_millis() as u64)
            .unwrap_or(0)
    }

    fn segment_duration_ms(&self, now: Instant) -> u64 {
        self.segment_accum_ms + self.running_ms(now)
    }

    /// Fold running active time into the accumulators.
    fn fold_active(&mut self, now: Instant) {
        if let Some(since) = self.active_since.take() {
            let delta = now.saturating_duration_since(since).as_millis() as u64;
            self.session_accum_ms += delta;
            self.segment_accum_ms += delta;
        }
    }

    fn crosses_threshold(&self, incoming_bytes: u64, now: Instant) -> bool {
        let Some(config) = self.config.as_ref() else {
            return false;
        };
        match config.auto_split {
            AutoSplitPolicy::None => false,
            AutoSplitPolicy::BySize { max_mb } => {
                self.segment_bytes + incoming_bytes > max_mb * 1024 * 1024
            }
            AutoSplitPolicy::ByTime { max_minutes } => {
                self.segment_duration_ms(now) >= u64::from(max_minutes) * 60_000
            }
        }
    }

    /// Close out the current segment and advance to the next file index.
    fn take_segment(&mut self, now: Instant) -> SegmentPlan {
        self.fold_active(now);
        let plan = SegmentPlan {
            file_index: self.file_index,
            chunk_count: self.chunks.len(),
            byte_size: self.segment_bytes,
            duration_ms: self.segment_accum_ms,
        };
        self.chunks.clear();
        self.segment_bytes = 0;
        self.segment_accum_ms = 0;
        self.file_index += 1;
        // restart the clock for the next segment unless we are stopping
        if self.phase.is_recording() {
            self.active_since = Some(now);
        }
        plan
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}
