use serde::{Deserialize, Serialize};

/// One entry of the codec catalog.
///
/// The catalog is configuration data, not code: new formats are added as
/// entries without touching negotiation logic. Whether a profile is
/// supported is derived from the runtime at negotiation time and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecProfile {
    pub name: String,
    pub mime_type: String,
    pub container: String,
    /// Video bitrate in bits/s, tuned for 1080p.
    pub video_bitrate: u32,
    pub audio_bitrate: u32,
    pub extension: String,
}

impl CodecProfile {
    /// Scale the 1080p-tuned video bitrate to the requested resolution tier.
    pub fn video_bitrate_for_height(&self, height: u32) -> u32 {
        let scale = match height {
            h if h >= 2160 => 4.0,
            h if h >= 1440 => 2.5,
            h if h >= 1080 => 1.0,
            h if h >= 720 => 0.6,
            _ => 0.4,
        };
        (self.video_bitrate as f64 * scale) as u32
    }
}

/// Built-in codec catalog, highest priority first.
pub fn default_catalog() -> Vec<CodecProfile> {
    vec![
        CodecProfile {
            name: "WebM (VP9)".into(),
            mime_type: "video/webm;codecs=vp9,opus".into(),
            container: "webm".into(),
            video_bitrate: 8_000_000,
            audio_bitrate: 128_000,
            extension: ".webm".into(),
        },
        CodecProfile {
            name: "WebM (VP8)".into(),
            mime_type: "video/webm;codecs=vp8,opus".into(),
            container: "webm".into(),
            video_bitrate: 10_000_000,
            audio_bitrate: 128_000,
            extension: ".webm".into(),
        },
        CodecProfile {
            name: "MP4 (H.264)".into(),
            mime_type: "video/mp4;codecs=avc1.42E01E,mp4a.40.2".into(),
            container: "mp4".into(),
            video_bitrate: 10_000_000,
            audio_bitrate: 128_000,
            extension: ".mp4".into(),
        },
        CodecProfile {
            name: "MP4 (H.265)".into(),
            mime_type: "video/mp4;codecs=hvc1".into(),
            container: "mp4".into(),
            video_bitrate: 6_000_000,
            audio_bitrate: 128_000,
            extension: ".mp4".into(),
        },
        CodecProfile {
            name: "WebM (AV1)".into(),
            mime_type: "video/webm;codecs=av01.0.08M.08,opus".into(),
            container: "webm".into(),
            video_bitrate: 6_000_000,
            audio_bitrate: 128_000,
            extension: ".webm".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_priority_order() {
        let catalog = default_catalog();
        assert_eq!(catalog[0].name, "WebM (VP9)");
        assert_eq!(catalog.last().unwrap().name, "WebM (AV1)");
    }

    #[test]
    fn bitrate_scales_by_tier() {
        let profile = &default_catalog()[0]; // 8 Mbps at 1080p
        assert_eq!(profile.video_bitrate_for_height(2160), 32_000_000);
        assert_eq!(profile.video_bitrate_for_height(1440), 20_000_000);
        assert_eq!(profile.video_bitrate_for_height(1080), 8_000_000);
        assert_eq!(profile.video_bitrate_for_height(720), 4_800_000);
        assert_eq!(profile.video_bitrate_for_height(480), 3_200_000);
    }

    #[test]
    fn profile_round_trips_as_json() {
        let profile = &default_catalog()[2];
        let json = serde_json::to_string(profile).unwrap();
        let back: CodecProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(*profile, back);
        assert!(json.contains("mimeType")); // interchange shape is camelCase
    }
}
