use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One time-sliced piece of recorder output.
///
/// Insertion order is the sole ordering authority: per-chunk timestamps are
/// informational and never trusted across chunks from different devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub sequence: u64,
    pub data: Vec<u8>,
    pub captured_at_ms: u64,
}

impl Chunk {
    pub fn meta(&self) -> ChunkMeta {
        ChunkMeta {
            sequence: self.sequence,
            byte_size: self.data.len() as u64,
        }
    }
}

/// Chunk metadata as seen by the session state machine, which never touches
/// payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    pub sequence: u64,
    pub byte_size: u64,
}

/// Which persistence strategy ended up writing an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    DirectHandle,
    Picker,
    Download,
}

/// A durably stored recording segment or photo. Immutable once created;
/// every session that reaches `Stopped` produced at least one of these.
///
/// Serializable for the JSON metadata sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArtifact {
    pub filename: String,
    pub size_bytes: u64,
    pub strategy_used: StrategyKind,
    pub recording_unit_id: String,
    /// SHA-256 hex digest of the stored blob.
    pub checksum: String,
    /// Wall-clock duration tracked by the session, since the container
    /// format frequently omits duration metadata.
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}
