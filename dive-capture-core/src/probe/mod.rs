//! Device capability probing and settings validation.
//!
//! Capability queries briefly acquire the device stream and always release
//! it before returning; they are mutually exclusive with an active recording
//! session on the same device.

use std::fmt;
use std::sync::Arc;

use crate::models::codec::CodecProfile;
use crate::models::config::{CaptureConfig, Resolution};
use crate::models::device::{
    DependencyKind, DeviceCapabilities, DeviceDescriptor, DeviceKind, MissingDependency,
};
use crate::traits::media_backend::{MediaBackend, StreamGuard, StreamRequest};

/// Advisory problem found when validating settings against device limits.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsWarning {
    ExceedsDeviceResolution {
        requested: Resolution,
        max_width: u32,
        max_height: u32,
    },
    ExceedsDeviceFrameRate {
        requested: f64,
        max: f64,
    },
    /// 4K@60fps drops frames on most consumer hardware even when the device
    /// nominally supports it.
    HighDropRiskCombination {
        resolution: Resolution,
        frame_rate: f64,
    },
    CapabilitiesUnknown,
}

impl fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExceedsDeviceResolution { requested, max_width, max_height } => write!(
                f,
                "requested resolution {} exceeds the device maximum of {}x{}",
                requested, max_width, max_height
            ),
            Self::ExceedsDeviceFrameRate { requested, max } => {
                write!(f, "requested frame rate {} exceeds the device maximum of {}", requested, max)
            }
            Self::HighDropRiskCombination { resolution, frame_rate } => write!(
                f,
                "{} at {} fps is known to drop frames on consumer hardware; consider 30 fps",
                resolution, frame_rate
            ),
            Self::CapabilitiesUnknown => {
                write!(f, "device capabilities are unknown; settings could not be verified")
            }
        }
    }
}

/// Outcome of validating a config against device capabilities.
///
/// Warnings are advisory: the caller decides whether to proceed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub warnings: Vec<SettingsWarning>,
}

/// Enumerates capture devices and queries their hardware capabilities
/// without seizing permanent control of them.
pub struct DeviceCapabilityProbe<B: MediaBackend> {
    backend: Arc<B>,
}

impl<B: MediaBackend> DeviceCapabilityProbe<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// List devices split into (video, audio).
    ///
    /// Fails soft: on a backend error this logs a warning and returns empty
    /// lists, because the caller must still render a device picker.
    pub fn enumerate(&self) -> (Vec<DeviceDescriptor>, Vec<DeviceDescriptor>) {
        let devices = match self.backend.enumerate_devices() {
            Ok(devices) => devices,
            Err(err) => {
                log::warn!("device enumeration failed: {}", err);
                return (Vec::new(), Vec::new());
            }
        };

        devices.into_iter().partition(|d| d.kind == DeviceKind::Video)
    }

    /// Briefly acquire the device and read its capability ranges.
    ///
    /// The stream is released before returning on every exit path. A
    /// hot-plug notification observed mid-query invalidates the result:
    /// `None` is returned and the caller should re-enumerate rather than
    /// consume stale data.
    pub fn query_capabilities(&self, device_id: &str, kind: DeviceKind) -> Option<DeviceCapabilities> {
        let generation = self.backend.device_generation();

        let request = match kind {
            DeviceKind::Video => StreamRequest {
                video_device_id: Some(device_id.to_string()),
                audio_device_id: None,
                resolution: Resolution::new(640, 480),
                frame_rate: 30.0,
            },
            DeviceKind::Audio => StreamRequest {
                video_device_id: None,
                audio_device_id: Some(device_id.to_string()),
                resolution: Resolution::new(640, 480),
                frame_rate: 30.0,
            },
        };

        let guard = match self.backend.open_stream(&request) {
            Ok(stream) => StreamGuard::new(stream),
            Err(err) => {
                log::warn!("capability query failed to acquire {}: {}", device_id, err);
                return None;
            }
        };

        let capabilities = guard.capabilities();
        drop(guard);

        if self.backend.device_generation() != generation {
            log::warn!(
                "device set changed during capability query for {}; discarding stale result",
                device_id
            );
            return None;
        }

        capabilities
    }

    /// Check for the platform primitives capture depends on.
    ///
    /// Returns a structured, user-actionable list rather than a boolean so
    /// the UI can explain why capture is unavailable.
    pub fn detect_missing_dependencies(&self, catalog: &[CodecProfile]) -> Vec<MissingDependency> {
        let mut missing = Vec::new();

        if !self.backend.supports_chunked_recording() {
            missing.push(MissingDependency {
                kind: DependencyKind::ChunkedRecording,
                name: "chunked recording API".into(),
                reason: "the runtime has no chunked-recording primitive".into(),
                recommendation: "update the workstation browser to Chrome 86 or later".into(),
            });
        }

        if !self.backend.supports_directory_access() {
            missing.push(MissingDependency {
                kind: DependencyKind::DirectoryAccess,
                name: "directory write API".into(),
                reason: "no directory-write primitive; recordings will fall back to downloads".into(),
                recommendation: "use a Chromium-based browser to save directly into the project directory".into(),
            });
        }

        if !catalog.iter().any(|p| self.backend.is_type_supported(&p.mime_type)) {
            missing.push(MissingDependency {
                kind: DependencyKind::Codec,
                name: "video codec".into(),
                reason: "none of the catalog codecs are supported by this runtime".into(),
                recommendation: "update the workstation browser; recording is blocked until a codec is available".into(),
            });
        }

        missing
    }

    /// Validate a config against capability limits without mutating it.
    ///
    /// Exceeding a device maximum is a warning, not a hard failure, and
    /// absence of capability data is itself a warning rather than a silent
    /// pass.
    pub fn validate_settings(
        &self,
        config: &CaptureConfig,
        capabilities: Option<&DeviceCapabilities>,
    ) -> ValidationReport {
        let mut warnings = Vec::new();

        match capabilities {
            None => warnings.push(SettingsWarning::CapabilitiesUnknown),
            Some(caps) => {
                if config.resolution.width > caps.max_width || config.resolution.height > caps.max_height {
                    warnings.push(SettingsWarning::ExceedsDeviceResolution {
                        requested: config.resolution,
                        max_width: caps.max_width,
                        max_height: caps.max_height,
                    });
                }
                if config.frame_rate > caps.max_frame_rate {
                    warnings.push(SettingsWarning::ExceedsDeviceFrameRate {
                        requested: config.frame_rate,
                        max: caps.max_frame_rate,
                    });
                }
            }
        }

        if config.resolution.height >= 2160 && config.frame_rate >= 60.0 {
            warnings.push(SettingsWarning::HighDropRiskCombination {
                resolution: config.resolution,
                frame_rate: config.frame_rate,
            });
        }

        ValidationReport {
            valid: warnings.is_empty(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codec::default_catalog;
    use crate::testing::{audio_device, video_device, MockBackend};
    use std::sync::atomic::Ordering;

    #[test]
    fn enumerate_splits_by_kind() {
        let backend = Arc::new(MockBackend {
            devices: vec![
                video_device("cam-1", "USB Camera"),
                audio_device("mic-1", "Headset Microphone"),
                video_device("cam-2", "Integrated Webcam"),
            ],
            ..Default::default()
        });
        let probe = DeviceCapabilityProbe::new(backend);

        let (video, audio) = probe.enumerate();
        assert_eq!(video.len(), 2);
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].id, "mic-1");
    }

    #[test]
    fn enumerate_fails_soft() {
        let backend = Arc::new(MockBackend {
            enumeration_fails: true,
            ..Default::default()
        });
        let probe = DeviceCapabilityProbe::new(backend);

        let (video, audio) = probe.enumerate();
        assert!(video.is_empty());
        assert!(audio.is_empty());
    }

    #[test]
    fn capability_query_releases_stream() {
        let backend = Arc::new(MockBackend::default());
        let released = Arc::clone(&backend.last_stream_released);
        let probe = DeviceCapabilityProbe::new(Arc::clone(&backend));

        let caps = probe.query_capabilities("cam-1", DeviceKind::Video);
        assert!(caps.is_some());
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn capability_query_releases_stream_when_acquisition_fails() {
        let backend = Arc::new(MockBackend {
            open_stream_error: Some(crate::models::error::CaptureError::PermissionDenied),
            ..Default::default()
        });
        let probe = DeviceCapabilityProbe::new(backend);

        assert!(probe.query_capabilities("cam-1", DeviceKind::Video).is_none());
    }

    #[test]
    fn hot_plug_mid_query_discards_result() {
        let backend = Arc::new(MockBackend {
            bump_generation_on_open: true,
            ..Default::default()
        });
        let released = Arc::clone(&backend.last_stream_released);
        let probe = DeviceCapabilityProbe::new(Arc::clone(&backend));

        assert!(probe.query_capabilities("cam-1", DeviceKind::Video).is_none());
        // the stale stream must still be released
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn detects_all_missing_dependencies() {
        let backend = Arc::new(MockBackend {
            chunked_recording: false,
            directory_access: false,
            supported_mimes: Vec::new(),
            ..Default::default()
        });
        let probe = DeviceCapabilityProbe::new(backend);

        let missing = probe.detect_missing_dependencies(&default_catalog());
        let kinds: Vec<_> = missing.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![DependencyKind::ChunkedRecording, DependencyKind::DirectoryAccess, DependencyKind::Codec]
        );
        assert!(missing.iter().all(|m| !m.recommendation.is_empty()));
    }

    #[test]
    fn no_missing_dependencies_on_capable_runtime() {
        let backend = Arc::new(MockBackend::default());
        let probe = DeviceCapabilityProbe::new(backend);

        assert!(probe.detect_missing_dependencies(&default_catalog()).is_empty());
    }

    #[test]
    fn validate_accepts_settings_within_limits() {
        let backend = Arc::new(MockBackend::default());
        let probe = DeviceCapabilityProbe::new(backend);
        let caps = DeviceCapabilities { max_width: 1920, max_height: 1080, max_frame_rate: 60.0 };

        let report = probe.validate_settings(&CaptureConfig::default(), Some(&caps));
        assert!(report.valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn validate_warns_on_exceeded_limits() {
        let backend = Arc::new(MockBackend::default());
        let probe = DeviceCapabilityProbe::new(backend);
        let caps = DeviceCapabilities { max_width: 1280, max_height: 720, max_frame_rate: 30.0 };
        let config = CaptureConfig {
            resolution: Resolution::FULL_HD,
            frame_rate: 60.0,
            ..Default::default()
        };

        let report = probe.validate_settings(&config, Some(&caps));
        assert!(!report.valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn four_k_sixty_warns_even_within_device_limits() {
        let backend = Arc::new(MockBackend::default());
        let probe = DeviceCapabilityProbe::new(backend);
        let caps = DeviceCapabilities { max_width: 3840, max_height: 2160, max_frame_rate: 60.0 };
        let config = CaptureConfig {
            resolution: Resolution::UHD_4K,
            frame_rate: 60.0,
            ..Default::default()
        };

        let report = probe.validate_settings(&config, Some(&caps));
        assert!(!report.valid);
        assert_eq!(
            report.warnings,
            vec![SettingsWarning::HighDropRiskCombination {
                resolution: Resolution::UHD_4K,
                frame_rate: 60.0,
            }]
        );
    }

    #[test]
    fn missing_capabilities_is_a_warning_not_a_pass() {
        let backend = Arc::new(MockBackend::default());
        let probe = DeviceCapabilityProbe::new(backend);

        let report = probe.validate_settings(&CaptureConfig::default(), None);
        assert!(!report.valid);
        assert_eq!(report.warnings, vec![SettingsWarning::CapabilitiesUnknown]);
    }
}
