//! # dive-capture-core
//!
//! Platform-agnostic capture core for offshore inspection dives.
//!
//! Provides device capability probing, codec negotiation, per-workstation
//! settings, the recording session state machine, and durable artifact
//! persistence. Platform-specific backends (browser/WebView media APIs)
//! implement the `MediaBackend` trait and plug into the generic pipeline.
//!
//! ## Architecture
//!
//! ```text
//! dive-capture-core (this crate)
//! ├── traits/    ← MediaBackend, MediaStream, RecorderHandle, CaptureDelegate, StorageTarget
//! ├── models/    ← CaptureError, SessionPhase, CaptureConfig, CodecProfile, DeviceDescriptor, etc.
//! ├── probe/     ← DeviceCapabilityProbe (enumeration, capability queries, validation)
//! ├── codec/     ← CodecNegotiator (ordered catalog walk)
//! ├── settings/  ← SettingsStore (per-workstation config, legacy migration)
//! ├── session/   ← SessionMachine (pure transitions) + RecordingSession (orchestrator)
//! └── storage/   ← PersistenceChain, filename generation, metadata sidecars
//! ```

pub mod codec;
pub mod models;
pub mod probe;
pub mod session;
pub mod settings;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use codec::CodecNegotiator;
pub use models::artifact::{Chunk, ChunkMeta, SavedArtifact, StrategyKind};
pub use models::codec::CodecProfile;
pub use models::config::{AutoSplitPolicy, CaptureConfig, Resolution};
pub use models::device::{DependencyKind, DeviceCapabilities, DeviceDescriptor, DeviceKind, MissingDependency};
pub use models::error::CaptureError;
pub use models::state::SessionPhase;
pub use probe::{DeviceCapabilityProbe, SettingsWarning, ValidationReport};
pub use session::machine::{SegmentPlan, SessionMachine, SideEffect};
pub use session::recorder::RecordingSession;
pub use settings::store::{SettingsPatch, SettingsStore, WorkstationSettings};
pub use storage::chain::PersistenceChain;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::media_backend::{ChunkSink, MediaBackend, MediaStream, RecorderHandle, StreamGuard, StreamRequest};
pub use traits::storage_target::StorageTarget;
