use std::fmt;

use serde::{Deserialize, Serialize};

/// Output resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const UHD_4K: Resolution = Resolution { width: 3840, height: 2160 };
    pub const FULL_HD: Resolution = Resolution { width: 1920, height: 1080 };
    pub const HD: Resolution = Resolution { width: 1280, height: 720 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::FULL_HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// When to close the current output file and continue recording into a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum AutoSplitPolicy {
    None,
    BySize { max_mb: u64 },
    ByTime { max_minutes: u32 },
}

impl Default for AutoSplitPolicy {
    fn default() -> Self {
        Self::None
    }
}

/// Capture settings for one recording session.
///
/// Validated against a `DeviceDescriptor` before use; an invalid config is
/// rejected with warnings, never silently clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConfig {
    pub video_device_id: Option<String>,
    pub audio_device_id: Option<String>,
    pub resolution: Resolution,
    pub frame_rate: f64,
    /// Catalog name of the negotiated codec profile.
    pub codec: String,
    pub auto_split: AutoSplitPolicy,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            video_device_id: None,
            audio_device_id: None,
            resolution: Resolution::FULL_HD,
            frame_rate: 30.0,
            codec: "WebM (VP9)".into(),
            auto_split: AutoSplitPolicy::None,
        }
    }
}
