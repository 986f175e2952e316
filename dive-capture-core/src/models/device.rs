use serde::{Deserialize, Serialize};

/// Whether a capture device produces video or audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Video,
    Audio,
}

/// Hardware limits reported by a device during a capability query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub max_width: u32,
    pub max_height: u32,
    pub max_frame_rate: f64,
}

/// Immutable snapshot of an enumerated capture device.
///
/// Capabilities are populated lazily because reading them requires a brief
/// exclusive acquisition of the device. A hot-plug event invalidates the
/// whole enumerated set; descriptors are never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub id: String,
    pub label: String,
    pub kind: DeviceKind,
    pub capabilities: Option<DeviceCapabilities>,
}

/// Category of platform primitive the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    ChunkedRecording,
    DirectoryAccess,
    Codec,
}

/// A required platform primitive that could not be found, with enough
/// context for the UI to explain why capture is unavailable and what the
/// operator can do about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub kind: DependencyKind,
    pub name: String,
    pub reason: String,
    pub recommendation: String,
}
