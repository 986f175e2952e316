//! Per-workstation capture settings.
//!
//! Settings are a JSON blob namespaced by a locally generated workstation id
//! (a persisted random UUID, not tied to any account). Legacy blobs with the
//! flat recording shape are migrated forward at read time only; storage is
//! rewritten in the current shape on the next explicit save.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::config::{AutoSplitPolicy, Resolution};
use crate::models::device::DeviceDescriptor;
use crate::models::error::CaptureError;

const WORKSTATION_ID_FILE: &str = "workstation-id";
const DEFAULT_SPLIT_SIZE_MB: u64 = 500;

/// Video input selection for the workstation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoInputSettings {
    pub device_id: Option<String>,
    pub resolution: Resolution,
    pub frame_rate: f64,
}

impl Default for VideoInputSettings {
    fn default() -> Self {
        Self {
            device_id: None,
            resolution: Resolution::FULL_HD,
            frame_rate: 30.0,
        }
    }
}

/// Audio input selection for the workstation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioInputSettings {
    pub device_id: Option<String>,
}

/// Output format settings for one media kind (recording video or photos).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaFormatSettings {
    pub format: String,
    pub save_location: Option<String>,
    pub filename_prefix: String,
    pub auto_split: AutoSplitPolicy,
}

impl Default for MediaFormatSettings {
    fn default() -> Self {
        Self {
            format: "WebM (VP9)".into(),
            save_location: None,
            filename_prefix: "DIVE".into(),
            auto_split: AutoSplitPolicy::None,
        }
    }
}

impl MediaFormatSettings {
    fn default_photo() -> Self {
        Self {
            format: "PNG".into(),
            filename_prefix: "PHOTO".into(),
            ..Default::default()
        }
    }
}

/// Recording output settings, split into video and photo sub-configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingSettings {
    pub video: MediaFormatSettings,
    pub photo: MediaFormatSettings,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            video: MediaFormatSettings::default(),
            photo: MediaFormatSettings::default_photo(),
        }
    }
}

/// The persisted per-workstation settings blob (current shape).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkstationSettings {
    pub video: VideoInputSettings,
    pub audio: AudioInputSettings,
    pub recording: RecordingSettings,
    pub last_modified: Option<DateTime<Utc>>,
    pub workstation_id: Option<String>,
}

/// Legacy flat recording shape, kept backward-readable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyRecordingSettings {
    video_format: String,
    photo_format: String,
    save_location: Option<String>,
    filename_prefix: String,
    auto_split: bool,
    // the legacy key spells it with a capital B, which camelCase renaming
    // would miss
    #[serde(rename = "splitSizeMB")]
    split_size_mb: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacySettings {
    recording: LegacyRecordingSettings,
}

/// Partial update merged over the loaded settings on `save`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub video: Option<VideoInputSettings>,
    pub audio: Option<AudioInputSettings>,
    pub recording_video: Option<MediaFormatSettings>,
    pub recording_photo: Option<MediaFormatSettings>,
}

impl SettingsPatch {
    fn apply(&self, settings: &mut WorkstationSettings) {
        if let Some(video) = &self.video {
            settings.video = video.clone();
        }
        if let Some(audio) = &self.audio {
            settings.audio = audio.clone();
        }
        if let Some(video) = &self.recording_video {
            settings.recording.video = video.clone();
        }
        if let Some(photo) = &self.recording_photo {
            settings.recording.photo = photo.clone();
        }
    }
}

/// Loads and persists the per-workstation settings blob.
///
/// The in-memory cache is invalidated only by an explicit `save`, so
/// repeated loads without intervening saves return identical configs.
pub struct SettingsStore {
    dir: PathBuf,
    workstation_id: String,
    cached: Mutex<Option<WorkstationSettings>>,
}

impl SettingsStore {
    /// Open (or initialize) the settings directory, creating the persisted
    /// workstation id on first use.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CaptureError::StorageError(format!("failed to create settings directory: {}", e)))?;

        let id_path = dir.join(WORKSTATION_ID_FILE);
        let workstation_id = match fs::read_to_string(&id_path) {
            Ok(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                fs::write(&id_path, &id)
                    .map_err(|e| CaptureError::StorageError(format!("failed to persist workstation id: {}", e)))?;
                id
            }
        };

        Ok(Self {
            dir,
            workstation_id,
            cached: Mutex::new(None),
        })
    }

    pub fn workstation_id(&self) -> &str {
        &self.workstation_id
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join(format!("capture-settings-{}.json", self.workstation_id))
    }

    /// Load the settings blob, migrating a legacy shape forward in memory.
    ///
    /// Migration never eagerly rewrites storage — a bug in the transform
    /// must not destroy the original blob. The new shape is committed on
    /// the next explicit `save`.
    pub fn load(&self) -> Result<WorkstationSettings, CaptureError> {
        if let Some(cached) = self.cached.lock().as_ref() {
            return Ok(cached.clone());
        }

        let path = self.settings_path();
        let mut settings = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| CaptureError::StorageError(format!("failed to read settings: {}", e)))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| CaptureError::StorageError(format!("failed to parse settings: {}", e)))?;

            if is_current_shape(&value) {
                serde_json::from_value(value)
                    .map_err(|e| CaptureError::StorageError(format!("failed to decode settings: {}", e)))?
            } else {
                log::info!("migrating legacy settings shape in memory for workstation {}", self.workstation_id);
                migrate_legacy(value)?
            }
        } else {
            WorkstationSettings::default()
        };

        if settings.workstation_id.is_none() {
            settings.workstation_id = Some(self.workstation_id.clone());
        }

        *self.cached.lock() = Some(settings.clone());
        Ok(settings)
    }

    /// Merge the patch over the current settings, stamp `lastModified`, and
    /// replace the blob atomically (temp file + rename — old content is
    /// never partially overwritten field-by-field on disk).
    pub fn save(&self, patch: &SettingsPatch) -> Result<WorkstationSettings, CaptureError> {
        let mut settings = self.load()?;
        patch.apply(&mut settings);
        settings.last_modified = Some(Utc::now());
        settings.workstation_id = Some(self.workstation_id.clone());

        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| CaptureError::StorageError(format!("failed to serialize settings: {}", e)))?;

        let path = self.settings_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .map_err(|e| CaptureError::StorageError(format!("failed to write settings: {}", e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| CaptureError::StorageError(format!("failed to replace settings: {}", e)))?;

        *self.cached.lock() = Some(settings.clone());
        Ok(settings)
    }
}

fn is_current_shape(value: &serde_json::Value) -> bool {
    value
        .get("recording")
        .and_then(|r| r.get("video"))
        .map(|v| v.is_object())
        .unwrap_or(false)
}

fn migrate_legacy(value: serde_json::Value) -> Result<WorkstationSettings, CaptureError> {
    let legacy: LegacySettings = serde_json::from_value(value)
        .map_err(|e| CaptureError::StorageError(format!("failed to decode legacy settings: {}", e)))?;

    let mut settings = WorkstationSettings::default();
    let rec = legacy.recording;

    if !rec.video_format.is_empty() {
        settings.recording.video.format = rec.video_format;
    }
    if !rec.photo_format.is_empty() {
        settings.recording.photo.format = rec.photo_format;
    }
    if !rec.filename_prefix.is_empty() {
        settings.recording.video.filename_prefix = rec.filename_prefix.clone();
        settings.recording.photo.filename_prefix = rec.filename_prefix;
    }
    settings.recording.video.save_location = rec.save_location.clone();
    settings.recording.photo.save_location = rec.save_location;
    settings.recording.video.auto_split = if rec.auto_split {
        AutoSplitPolicy::BySize {
            max_mb: if rec.split_size_mb > 0 { rec.split_size_mb } else { DEFAULT_SPLIT_SIZE_MB },
        }
    } else {
        AutoSplitPolicy::None
    };

    Ok(settings)
}

fn prefer_external(devices: &[DeviceDescriptor]) -> Option<&DeviceDescriptor> {
    devices
        .iter()
        .find(|d| {
            let label = d.label.to_lowercase();
            label.contains("usb") || label.contains("external")
        })
        .or_else(|| devices.first())
}

/// Fill unset device selections with enumeration-based defaults.
///
/// External/USB-labeled devices are preferred over built-ins — built-in
/// webcams are a poor fit for fixed workstation rigs. This is a heuristic:
/// a device already chosen in the saved settings is left untouched.
pub fn apply_smart_defaults(
    settings: &mut WorkstationSettings,
    video_devices: &[DeviceDescriptor],
    audio_devices: &[DeviceDescriptor],
) {
    if settings.video.device_id.is_none() {
        settings.video.device_id = prefer_external(video_devices).map(|d| d.id.clone());
    }
    if settings.audio.device_id.is_none() {
        settings.audio.device_id = prefer_external(audio_devices).map(|d| d.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{audio_device, video_device};

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dive_settings_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn load_without_blob_yields_defaults_with_workstation_id() {
        let dir = temp_dir("defaults");
        let store = SettingsStore::open(&dir).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.video.resolution, Resolution::FULL_HD);
        assert_eq!(settings.recording.photo.format, "PNG");
        assert_eq!(settings.workstation_id.as_deref(), Some(store.workstation_id()));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loading_twice_without_saves_is_identical() {
        let dir = temp_dir("idempotent");
        let store = SettingsStore::open(&dir).unwrap();

        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert_eq!(first, second);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_round_trips_through_a_fresh_store() {
        let dir = temp_dir("roundtrip");
        let store = SettingsStore::open(&dir).unwrap();

        let patch = SettingsPatch {
            video: Some(VideoInputSettings {
                device_id: Some("cam-7".into()),
                resolution: Resolution::UHD_4K,
                frame_rate: 30.0,
            }),
            ..Default::default()
        };
        let saved = store.save(&patch).unwrap();
        assert!(saved.last_modified.is_some());

        let reopened = SettingsStore::open(&dir).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded, saved);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn workstation_id_is_stable_across_opens() {
        let dir = temp_dir("stable_id");
        let first = SettingsStore::open(&dir).unwrap().workstation_id().to_string();
        let second = SettingsStore::open(&dir).unwrap().workstation_id().to_string();
        assert_eq!(first, second);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn legacy_blob_migrates_in_memory_only() {
        let dir = temp_dir("legacy");
        let store = SettingsStore::open(&dir).unwrap();

        let legacy = r#"{
            "recording": {
                "videoFormat": "MP4 (H.264)",
                "photoFormat": "JPEG",
                "saveLocation": "D:/dives",
                "filenamePrefix": "ROV",
                "autoSplit": true,
                "splitSizeMB": 750
            }
        }"#;
        fs::write(store.settings_path(), legacy).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.recording.video.format, "MP4 (H.264)");
        assert_eq!(settings.recording.photo.format, "JPEG");
        assert_eq!(settings.recording.video.filename_prefix, "ROV");
        assert_eq!(settings.recording.video.save_location.as_deref(), Some("D:/dives"));
        assert_eq!(settings.recording.video.auto_split, AutoSplitPolicy::BySize { max_mb: 750 });

        // read-time migration must not rewrite storage
        let on_disk = fs::read_to_string(store.settings_path()).unwrap();
        assert_eq!(on_disk, legacy);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn legacy_split_size_survives_migration() {
        let dir = temp_dir("legacy_split");
        let store = SettingsStore::open(&dir).unwrap();

        // the legacy key is spelled "splitSizeMB", not "splitSizeMb"
        let legacy = r#"{"recording": {"videoFormat": "WebM (VP9)", "autoSplit": true, "splitSizeMB": 250}}"#;
        fs::write(store.settings_path(), legacy).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.recording.video.auto_split, AutoSplitPolicy::BySize { max_mb: 250 });

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn legacy_split_size_defaults_when_absent() {
        let dir = temp_dir("legacy_split_default");
        let store = SettingsStore::open(&dir).unwrap();

        let legacy = r#"{"recording": {"videoFormat": "WebM (VP9)", "autoSplit": true}}"#;
        fs::write(store.settings_path(), legacy).unwrap();

        let settings = store.load().unwrap();
        assert_eq!(settings.recording.video.auto_split, AutoSplitPolicy::BySize { max_mb: 500 });

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_commits_migrated_shape() {
        let dir = temp_dir("legacy_commit");
        let store = SettingsStore::open(&dir).unwrap();

        let legacy = r#"{"recording": {"videoFormat": "WebM (VP8)", "photoFormat": "PNG", "autoSplit": false}}"#;
        fs::write(store.settings_path(), legacy).unwrap();

        store.load().unwrap();
        store.save(&SettingsPatch::default()).unwrap();

        let on_disk = fs::read_to_string(store.settings_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
        assert!(value["recording"]["video"].is_object());
        assert_eq!(value["recording"]["video"]["format"], "WebM (VP8)");
        assert!(value["lastModified"].is_string());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn smart_defaults_prefer_usb_devices() {
        let mut settings = WorkstationSettings::default();
        let video = vec![
            video_device("cam-builtin", "Integrated Webcam"),
            video_device("cam-usb", "USB Capture HDMI"),
        ];
        let audio = vec![audio_device("mic-1", "Internal Microphone")];

        apply_smart_defaults(&mut settings, &video, &audio);
        assert_eq!(settings.video.device_id.as_deref(), Some("cam-usb"));
        assert_eq!(settings.audio.device_id.as_deref(), Some("mic-1"));
    }

    #[test]
    fn smart_defaults_never_override_saved_selection() {
        let mut settings = WorkstationSettings::default();
        settings.video.device_id = Some("cam-chosen".into());

        let video = vec![video_device("cam-usb", "USB Capture HDMI")];
        apply_smart_defaults(&mut settings, &video, &[]);
        assert_eq!(settings.video.device_id.as_deref(), Some("cam-chosen"));
    }
}
